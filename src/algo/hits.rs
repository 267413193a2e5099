use tracing::{debug, trace};

use super::*;

/// Hub and authority scores computed by [`Hits::run`]
#[derive(Debug, Clone)]
pub struct HitsResult<K> {
    pub hubs: Scores<K>,
    pub authorities: Scores<K>,
    pub iterations: usize,
    pub converged: bool,
}

/// Kleinberg's hubs and authorities.
///
/// Authorities are the sum of hub scores of their in-neighbors and hubs the sum of authority
/// scores of their out-neighbors. Both updates are L2-normalized and alternate, the hub update
/// already using the new authority scores. On undirected graphs hubs and authorities coincide.
#[derive(Debug, Clone, Copy)]
pub struct Hits {
    max_iterations: usize,
    tolerance: f64,
}

impl Default for Hits {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl Hits {
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

    pub fn run<G>(&self, graph: &G) -> HitsResult<G::Key>
    where
        G: AdjacencyList + NodeKeys,
    {
        let mut hubs = vec![0.0; graph.node_bound()];
        for u in graph.vertices() {
            hubs[u as usize] = 1.0;
        }
        l2_normalize(graph, &mut hubs);
        let mut authorities = vec![0.0; graph.node_bound()];

        let mut next_hubs = hubs.clone();
        let mut next_authorities = authorities.clone();

        let mut iterations = 0;
        let mut converged = graph.is_empty();
        while !converged && iterations < self.max_iterations {
            iterations += 1;

            for v in graph.vertices() {
                next_authorities[v as usize] = graph
                    .in_neighbors_of(v)
                    .map(|u| hubs[u as usize])
                    .sum();
            }
            l2_normalize(graph, &mut next_authorities);

            for u in graph.vertices() {
                next_hubs[u as usize] = graph
                    .neighbors_of(u)
                    .map(|v| next_authorities[v as usize])
                    .sum();
            }
            l2_normalize(graph, &mut next_hubs);

            let delta = max_delta(graph, &hubs, &next_hubs)
                .max(max_delta(graph, &authorities, &next_authorities));
            std::mem::swap(&mut hubs, &mut next_hubs);
            std::mem::swap(&mut authorities, &mut next_authorities);
            trace!(iteration = iterations, delta, "HITS");

            converged = delta < self.tolerance;
        }

        debug!(iterations, converged, "HITS finished");
        HitsResult {
            hubs: scores_of(graph, &hubs),
            authorities: scores_of(graph, &authorities),
            iterations,
            converged,
        }
    }
}
