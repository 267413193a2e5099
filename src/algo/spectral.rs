/*!
Centrality measures computed by power iteration over in-neighbors.

Each iteration reads only the previous score vector, and the iteration stops as soon as the
maximum coordinate-wise change drops below the configured tolerance. Running out of iterations is
reported through [`CentralityResult::converged`].
*/

use tracing::{debug, trace};

use super::*;

/// Weight of an edge as seen by a (possibly unweighted) power iteration
#[inline]
fn edge_factor(weight: Weight, weighted: bool) -> f64 {
    if weighted { weight } else { 1.0 }
}

/// Eigenvector centrality.
///
/// Iterates `x'(v) = x(v) + sum w(u, v) * x(u)` over all in-neighbors `u` of `v` followed by
/// L2-normalization, starting from the uniform vector. The added `x(v)` shifts the spectrum by one
/// which does not change the dominant eigenvector but prevents oscillation on bipartite graphs.
#[derive(Debug, Clone, Copy)]
pub struct EigenvectorCentrality {
    max_iterations: usize,
    tolerance: f64,
    weighted: bool,
}

impl Default for EigenvectorCentrality {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            weighted: false,
        }
    }
}

impl EigenvectorCentrality {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.set_max_iterations(max_iterations);
        self
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.set_tolerance(tolerance);
        self
    }

    pub fn set_weighted(&mut self, weighted: bool) {
        self.weighted = weighted;
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.set_weighted(weighted);
        self
    }

    pub fn run<G>(&self, graph: &G) -> CentralityResult<G::Key>
    where
        G: AdjacencyList + NodeKeys,
    {
        let n = graph.number_of_nodes();
        if n == 0 {
            return CentralityResult {
                scores: Scores::default(),
                iterations: 0,
                converged: true,
            };
        }

        let mut scores = vec![0.0; graph.node_bound()];
        for u in graph.vertices() {
            scores[u as usize] = 1.0 / n as f64;
        }
        let mut next = scores.clone();

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            iterations += 1;

            for v in graph.vertices() {
                next[v as usize] = scores[v as usize]
                    + graph
                        .in_edges_of(v)
                        .map(|e| edge_factor(e.weight, self.weighted) * scores[e.source as usize])
                        .sum::<f64>();
            }
            l2_normalize(graph, &mut next);

            let delta = max_delta(graph, &scores, &next);
            std::mem::swap(&mut scores, &mut next);
            trace!(iteration = iterations, delta, "eigenvector centrality");

            if delta < self.tolerance {
                converged = true;
                break;
            }
        }

        debug!(iterations, converged, "eigenvector centrality finished");
        CentralityResult {
            scores: scores_of(graph, &scores),
            iterations,
            converged,
        }
    }
}

/// Katz centrality.
///
/// Iterates `x'(v) = alpha * sum w(u, v) * x(u) + beta` over all in-neighbors `u` of `v`,
/// starting from the zero vector. The iteration converges if `alpha` is smaller than the
/// reciprocal of the largest eigenvalue of the adjacency matrix. With `normalized`, the final
/// vector is scaled to unit L2-norm.
#[derive(Debug, Clone, Copy)]
pub struct KatzCentrality {
    alpha: f64,
    beta: f64,
    max_iterations: usize,
    tolerance: f64,
    normalized: bool,
    weighted: bool,
}

impl Default for KatzCentrality {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 1.0,
            max_iterations: 1000,
            tolerance: 1e-6,
            normalized: true,
            weighted: false,
        }
    }
}

impl KatzCentrality {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attenuation factor
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    /// Sets the attenuation factor
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.set_alpha(alpha);
        self
    }

    /// Sets the base score every node receives
    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta;
    }

    /// Sets the base score every node receives
    pub fn beta(mut self, beta: f64) -> Self {
        self.set_beta(beta);
        self
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.set_max_iterations(max_iterations);
        self
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.set_tolerance(tolerance);
        self
    }

    pub fn set_normalized(&mut self, normalized: bool) {
        self.normalized = normalized;
    }

    pub fn normalized(mut self, normalized: bool) -> Self {
        self.set_normalized(normalized);
        self
    }

    pub fn set_weighted(&mut self, weighted: bool) {
        self.weighted = weighted;
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.set_weighted(weighted);
        self
    }

    /// Fails with [`GraphError::InvalidParameter`] if `alpha` is not positive or `beta` is not
    /// finite.
    pub fn run<G>(&self, graph: &G) -> Result<CentralityResult<G::Key>>
    where
        G: AdjacencyList + NodeKeys,
    {
        ensure_parameter!(
            self.alpha.is_finite() && self.alpha > 0.0,
            "alpha must be positive, got {}",
            self.alpha
        );
        ensure_parameter!(self.beta.is_finite(), "beta must be finite");

        let mut scores = vec![0.0; graph.node_bound()];
        let mut next = scores.clone();

        let mut iterations = 0;
        let mut converged = graph.is_empty();
        while !converged && iterations < self.max_iterations {
            iterations += 1;

            for v in graph.vertices() {
                next[v as usize] = self.alpha
                    * graph
                        .in_edges_of(v)
                        .map(|e| edge_factor(e.weight, self.weighted) * scores[e.source as usize])
                        .sum::<f64>()
                    + self.beta;
            }

            let delta = max_delta(graph, &scores, &next);
            std::mem::swap(&mut scores, &mut next);
            trace!(iteration = iterations, delta, "Katz centrality");

            converged = delta < self.tolerance;
        }

        if self.normalized {
            l2_normalize(graph, &mut scores);
        }

        debug!(iterations, converged, "Katz centrality finished");
        Ok(CentralityResult {
            scores: scores_of(graph, &scores),
            iterations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gens::*;

    fn assert_near(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn eigenvector_star() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges((1..5).map(|v| (0, v, 1.0))).unwrap();

        let result = g.eigenvector_centrality();
        assert!(result.converged);
        assert_near(result.scores[&0], 0.5f64.sqrt());
        for v in 1..5 {
            assert_near(result.scores[&v], 0.125f64.sqrt());
        }

        let result = EigenvectorCentrality::new().max_iterations(1).run(&g);
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn eigenvector_acyclic_mass_moves_to_sinks() {
        let mut g: Graph<char> = Graph::directed();
        g.connect_path(['a', 'b', 'c']).unwrap();

        // the shift keeps sources positive instead of decaying to zero
        let result = g.eigenvector_centrality();
        let scores = &result.scores;
        assert!(scores[&'a'] > 0.0);
        assert!(scores[&'a'] < scores[&'b'] && scores[&'b'] < scores[&'c']);
        assert!(scores[&'c'] > 0.99);
    }

    #[test]
    fn eigenvector_directed_cycle() {
        let mut g: Graph<char> = Graph::directed();
        g.connect_cycle(['a', 'b', 'c']).unwrap();

        let result = g.eigenvector_centrality();
        assert!(result.converged);
        for u in ['a', 'b', 'c'] {
            assert_near(result.scores[&u], 1.0 / 3.0f64.sqrt());
        }
    }

    #[test]
    fn eigenvector_weights() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 1.0), (1, 2, 4.0)]).unwrap();

        let plain = g.eigenvector_centrality();
        let weighted = EigenvectorCentrality::new().weighted(true).run(&g);
        assert_near(plain.scores[&0], plain.scores[&2]);
        assert!(weighted.scores[&2] > weighted.scores[&0]);
    }

    #[test]
    fn katz_path() {
        let mut g: Graph<u32> = Graph::directed();
        g.connect_path([0, 1, 2]).unwrap();

        let result = KatzCentrality::new().normalized(false).run(&g).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 4);
        assert_near(result.scores[&0], 1.0);
        assert_near(result.scores[&1], 1.1);
        assert_near(result.scores[&2], 1.11);

        let result = g.katz_centrality().unwrap();
        let norm: f64 = result.scores.values().map(|x| x * x).sum();
        assert_near(norm, 1.0);
        assert!(result.scores[&2] > result.scores[&1]);
    }

    #[test]
    fn katz_parameters() {
        let g: Graph<u32> = Graph::directed();
        assert!(matches!(
            KatzCentrality::new().alpha(0.0).run(&g),
            Err(GraphError::InvalidParameter(_))
        ));
        assert!(matches!(
            KatzCentrality::new().beta(f64::NAN).run(&g),
            Err(GraphError::InvalidParameter(_))
        ));

        let result = KatzCentrality::new().run(&g).unwrap();
        assert!(result.converged && result.scores.is_empty());
    }
}
