use super::*;
use crate::utils::geometric::GeometricJumper;

/// A G(n, p) graph can be defined by either a probability or the average degree which is more
/// common in practice
#[derive(Debug, Copy, Clone, Default)]
enum GnpType {
    /// No value has been set yet
    #[default]
    NotSet,
    /// Direct probability value
    Prob(f64),
    /// Expected degree of a node
    AvgDeg(f64),
}

/// `G(n,p)` graphs contain every possible edge between the keys `0..n` independently with
/// probability `p`.
///
/// Undirected graphs consider each unordered pair once, directed graphs each ordered pair.
/// Self-loops are only sampled if enabled. Edges get weight [`DEFAULT_WEIGHT`] unless a weight
/// range is set, in which case weights are drawn uniformly from it.
#[derive(Debug, Copy, Clone, Default)]
pub struct Gnp {
    n: NumNodes,
    p: GnpType,
    directed: bool,
    self_loops: bool,
    weights: Option<(Weight, Weight)>,
}

impl Gnp {
    /// Creates a new empty `G(n,p)` generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates `n`
    pub fn nodes(mut self, n: NumNodes) -> Self {
        self.n = n;
        self
    }

    /// Updates `p` directly
    ///
    /// ** Panics if `prob` is not in `[0, 1]` **
    pub fn prob(mut self, prob: f64) -> Self {
        assert!(prob.is_valid_probability(), "invalid probability {prob}");
        self.p = GnpType::Prob(prob);
        self
    }

    /// Updates `p` such that every node has expected degree `deg`.
    /// Note that this conversion will only be done when calling `generate`.
    pub fn avg_deg(mut self, deg: f64) -> Self {
        self.p = GnpType::AvgDeg(deg);
        self
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn self_loops(mut self, self_loops: bool) -> Self {
        self.self_loops = self_loops;
        self
    }

    /// Draws weights uniformly from `[low, high)` instead of using [`DEFAULT_WEIGHT`]
    ///
    /// ** Panics if `low >= high` **
    pub fn weights(mut self, low: Weight, high: Weight) -> Self {
        assert!(low < high, "empty weight range [{low}, {high})");
        self.weights = Some((low, high));
        self
    }

    /// Resolves the edge probability.
    /// ** Panics if no probability was set or the average degree is out of range **
    fn probability(&self) -> f64 {
        match self.p {
            GnpType::NotSet => panic!("probability of Gnp was not set"),
            GnpType::Prob(p) => p,
            GnpType::AvgDeg(d) => {
                let candidates = if self.self_loops { self.n } else { self.n - 1 };
                let p = if candidates == 0 {
                    0.0
                } else {
                    d / candidates as f64
                };
                assert!(
                    p.is_valid_probability(),
                    "average degree {d} is invalid for {} nodes",
                    self.n
                );
                p
            }
        }
    }

    /// Samples the edges as pairs of keys.
    /// Edges of undirected graphs are reported with the smaller key first.
    pub fn edges<R: Rng>(&self, rng: &mut R) -> Vec<Edge> {
        if self.n == 0 {
            return Vec::new();
        }

        let n = self.n as u64;
        let p = self.probability();
        let directed = self.directed;
        let self_loops = self.self_loops;

        GeometricJumper::new(p)
            .stop_at(n * n)
            .iter(rng)
            .map(|x| Edge((x / n) as Node, (x % n) as Node))
            .filter(|e| directed || e.0 <= e.1)
            .filter(|e| self_loops || !e.is_loop())
            .collect()
    }

    /// Generates a graph over the keys `0..n`.
    ///
    /// ** Panics if no probability was set **
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Graph<Node> {
        let edges = self.edges(rng);

        let config = GraphConfig::new()
            .directed(self.directed)
            .allow_self_loops(self.self_loops);
        let mut graph = Graph::new(config);
        for u in 0..self.n {
            graph.add_node(u);
        }

        for Edge(u, v) in edges {
            let weight = match self.weights {
                Some((low, high)) => rng.random_range(low..high),
                None => DEFAULT_WEIGHT,
            };
            // sampled pairs are distinct and respect the configuration
            let inserted = graph.add_edge(u, v, weight).is_ok();
            debug_assert!(inserted);
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn trivial_probabilities() {
        let rng = &mut Pcg64Mcg::seed_from_u64(1);

        let g = Gnp::new().nodes(10).prob(0.0).generate(rng);
        assert_eq!(g.node_count(), 10);
        assert_eq!(g.edge_count(), 0);

        let g = Gnp::new().nodes(10).prob(1.0).generate(rng);
        assert_eq!(g.edge_count(), 45);

        let g = Gnp::new().nodes(10).prob(1.0).directed(true).generate(rng);
        assert_eq!(g.edge_count(), 90);

        let g = Gnp::new()
            .nodes(10)
            .prob(1.0)
            .directed(true)
            .self_loops(true)
            .generate(rng);
        assert_eq!(g.edge_count(), 100);

        assert_eq!(Gnp::new().nodes(0).prob(0.5).generate(rng).node_count(), 0);
    }

    #[test]
    fn average_degree() {
        let rng = &mut Pcg64Mcg::seed_from_u64(2);
        let n = 2000;
        let g = Gnp::new().nodes(n).avg_deg(10.0).generate(rng);

        let avg = 2.0 * g.edge_count() as f64 / n as f64;
        assert!((9.0..11.0).contains(&avg), "average degree {avg}");
        assert!(!g.is_directed());
    }

    #[test]
    fn weight_range() {
        let rng = &mut Pcg64Mcg::seed_from_u64(3);
        let g = Gnp::new()
            .nodes(50)
            .prob(0.2)
            .weights(2.0, 3.0)
            .generate(rng);

        assert!(g.edge_count() > 0);
        assert!(g.edges().all(|e| (2.0..3.0).contains(&e.weight)));
        assert!(g.edges().all(|e| e.source != e.target));
    }

    #[test]
    #[should_panic]
    fn missing_probability() {
        let rng = &mut Pcg64Mcg::seed_from_u64(4);
        Gnp::new().nodes(5).generate(rng);
    }

    #[test]
    #[should_panic]
    fn invalid_probability() {
        Gnp::new().prob(1.5);
    }
}
