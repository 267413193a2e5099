//! Shared fixtures for unit tests

use rand::Rng;

use crate::{gens::Gnp, prelude::*};

/// `G(n,p)` graph over the keys `0..n` with unit weights
pub fn random_graph<R: Rng>(rng: &mut R, n: NumNodes, p: f64, directed: bool) -> Graph<Node> {
    Gnp::new().nodes(n).prob(p).directed(directed).generate(rng)
}

/// `G(n,p)` graph over the keys `0..n` with weights drawn uniformly from `[1, 10)`
pub fn random_weighted_graph<R: Rng>(
    rng: &mut R,
    n: NumNodes,
    p: f64,
    directed: bool,
) -> Graph<Node> {
    Gnp::new()
        .nodes(n)
        .prob(p)
        .directed(directed)
        .weights(1.0, 10.0)
        .generate(rng)
}

/// Asserts that two floats agree up to a relative error of `1e-9`.
/// Infinities must match exactly.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    if actual.is_infinite() || expected.is_infinite() {
        assert_eq!(actual, expected);
        return;
    }

    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} differs from {expected}"
    );
}
