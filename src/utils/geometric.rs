use rand::Rng;
use rand_distr::Geometric;

use crate::utils::Probability;

#[derive(Debug, Copy, Clone)]
enum JumpMode {
    /// `p = 0`
    Never,
    /// `p = 1`
    Always,
    /// Jump over failures directly
    Skip(Geometric),
    /// For `p > 1/2`, jump over successes instead and report everything in between
    Inverted(Geometric),
}

/// Samples the indices in `0..stop` that succeed in independent Bernoulli trials with
/// probability `prob`. Instead of one coin flip per index, the distance to the next success
/// is drawn from a geometric distribution, so the cost is proportional to the output size.
#[derive(Debug, Copy, Clone)]
pub struct GeometricJumper {
    prob: f64,
    stop: u64,
}

impl GeometricJumper {
    /// Creates a new jumper over `0..u64::MAX`.
    ///
    /// ** Panics if `prob` is not in `[0, 1]` **
    pub fn new(prob: f64) -> Self {
        assert!(prob.is_valid_probability(), "invalid probability {prob}");
        Self {
            prob,
            stop: u64::MAX,
        }
    }

    /// Restricts the jumper to indices below `stop`
    pub fn stop_at(mut self, stop: u64) -> Self {
        self.stop = stop;
        self
    }

    /// Creates an iterator over all successful indices in increasing order
    pub fn iter<R: Rng>(self, rng: &mut R) -> GeometricJumperIter<'_, R> {
        let mode = if self.prob == 0.0 {
            JumpMode::Never
        } else if self.prob == 1.0 {
            JumpMode::Always
        } else if self.prob <= 0.5 {
            Geometric::new(self.prob).map_or(JumpMode::Never, JumpMode::Skip)
        } else {
            Geometric::new(1.0 - self.prob).map_or(JumpMode::Always, JumpMode::Inverted)
        };

        let mut iter = GeometricJumperIter {
            mode,
            rng,
            stop: self.stop,
            cur: 0,
            next_failure: u64::MAX,
        };
        if let JumpMode::Inverted(distr) = mode {
            iter.next_failure = iter.rng.sample(distr);
        }
        iter
    }
}

/// Iterator created by [`GeometricJumper::iter`]
#[derive(Debug)]
pub struct GeometricJumperIter<'a, R: Rng> {
    mode: JumpMode,
    rng: &'a mut R,
    stop: u64,
    cur: u64,
    next_failure: u64,
}

impl<R: Rng> Iterator for GeometricJumperIter<'_, R> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if self.cur >= self.stop {
                return None;
            }

            match self.mode {
                JumpMode::Never => {
                    self.cur = self.stop;
                }
                JumpMode::Always => {
                    self.cur += 1;
                    return Some(self.cur - 1);
                }
                JumpMode::Skip(distr) => {
                    let skip = self.rng.sample(distr);
                    self.cur = self.cur.saturating_add(skip);
                    if self.cur >= self.stop {
                        self.cur = self.stop;
                        return None;
                    }
                    self.cur += 1;
                    return Some(self.cur - 1);
                }
                JumpMode::Inverted(distr) => {
                    if self.cur == self.next_failure {
                        self.cur += 1;
                        let skip = self.rng.sample(distr);
                        self.next_failure = self.cur.saturating_add(skip);
                        continue;
                    }
                    self.cur += 1;
                    return Some(self.cur - 1);
                }
            }
        }
    }
}
