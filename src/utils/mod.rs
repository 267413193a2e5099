/*!
# Utilities

Provides the generic primitives shared by several algorithm families:
- [`PriorityQueue`]: a binary min-heap of `(item, priority)` pairs used by Dijkstra, A* and Prim,
- [`UnionFind`]: a disjoint-set forest used by connected components and Kruskal,
- [`GeometricJumper`](self::geometric::GeometricJumper): skip-sampling for [`G(n,p)`](crate::gens::Gnp) graphs,
- [`Probability`]: validation of probability-like parameters.
*/

use num::{One, Zero};

pub mod geometric;
pub mod priority_queue;
pub mod union_find;

pub use priority_queue::PriorityQueue;
pub use union_find::UnionFind;

/// Helper trait for probabilities
pub trait Probability {
    /// Returns *true* if the probability is valid (ie. between `0` and `1`)
    fn is_valid_probability(&self) -> bool;
}

impl<P> Probability for P
where
    P: Zero + One + PartialOrd,
{
    fn is_valid_probability(&self) -> bool {
        Self::zero().le(self) && Self::one().ge(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities() {
        for p in [0.0, 0.5, 0.85, 1.0] {
            assert!(p.is_valid_probability());
        }
        for p in [-0.1, 1.01, f64::NAN] {
            assert!(!p.is_valid_probability());
        }
    }
}
