use fxhash::FxHashMap;
use rand::{Rng, seq::SliceRandom};
use tracing::{debug, trace};

use super::*;

/// Whether label updates become visible within the same iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationMode {
    /// All nodes update simultaneously from the labels of the previous iteration
    Synchronous,
    /// Nodes update one after another in random order and see earlier updates immediately
    #[default]
    Asynchronous,
}

/// Result of [`LabelPropagation::run`]
#[derive(Debug, Clone)]
pub struct LabelPropagationResult<K> {
    /// Communities ordered by their first member in node insertion order
    pub communities: Vec<Vec<K>>,
    pub iterations: usize,
    /// *true* if an iteration passed without any label change
    pub converged: bool,
}

/// Label propagation community detection.
///
/// Every node starts with a unique label and repeatedly adopts the label with the largest
/// (weighted) count among its neighbors. Ties are broken uniformly at random, but a node keeps
/// its current label whenever it is among the best. Edge directions and self-loops are ignored.
///
/// Synchronous updates may oscillate on bipartite structures; this is reported through
/// [`LabelPropagationResult::converged`].
#[derive(Debug, Clone, Copy)]
pub struct LabelPropagation {
    max_iterations: usize,
    mode: PropagationMode,
    weighted: bool,
}

impl Default for LabelPropagation {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            mode: PropagationMode::Asynchronous,
            weighted: false,
        }
    }
}

impl LabelPropagation {
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

    pub fn set_mode(&mut self, mode: PropagationMode) {
        self.mode = mode;
    }

    pub fn mode(mut self, mode: PropagationMode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn set_weighted(&mut self, weighted: bool) {
        self.weighted = weighted;
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.set_weighted(weighted);
        self
    }

    /// Fails with [`GraphError::InvalidOperation`] if `weighted` is set and the graph has
    /// negative weights.
    pub fn run<G, R>(&self, graph: &G, rng: &mut R) -> Result<LabelPropagationResult<G::Key>>
    where
        G: AdjacencyList + NodeKeys,
        R: Rng,
    {
        ensure_operation!(
            !self.weighted || !graph.has_negative_weights(),
            "weighted label propagation does not support negative weights"
        );

        let (nodes, _) = compact_ordinals(graph);
        let mut labels: Vec<usize> = (0..graph.node_bound()).collect();
        let mut previous = labels.clone();
        let mut order = nodes.clone();

        let mut counts: FxHashMap<usize, f64> = FxHashMap::default();
        let mut best = Vec::new();

        let mut iterations = 0;
        let mut converged = nodes.is_empty();
        while !converged && iterations < self.max_iterations {
            iterations += 1;

            let synchronous = self.mode == PropagationMode::Synchronous;
            if synchronous {
                previous.copy_from_slice(&labels);
            } else {
                order.shuffle(rng);
            }

            let mut changes = 0;
            for &u in &order {
                counts.clear();
                let source = if synchronous { &previous } else { &labels };

                let incident = graph
                    .out_edges_of(u)
                    .map(|e| (e.target, e.weight))
                    .chain(
                        graph
                            .in_edges_of(u)
                            .filter(|_| graph.is_directed())
                            .map(|e| (e.source, e.weight)),
                    );
                for (v, weight) in incident {
                    if v != u {
                        let weight = if self.weighted { weight } else { 1.0 };
                        *counts.entry(source[v as usize]).or_default() += weight;
                    }
                }

                let Some(max) = counts.values().copied().reduce(f64::max) else {
                    continue;
                };

                let current = source[u as usize];
                if counts.get(&current) == Some(&max) {
                    continue;
                }

                best.clear();
                best.extend(
                    counts
                        .iter()
                        .filter(|&(_, &count)| count == max)
                        .map(|(&label, _)| label),
                );
                best.sort_unstable();

                labels[u as usize] = best[rng.random_range(0..best.len())];
                changes += 1;
            }

            trace!(iteration = iterations, changes, "label propagation");
            converged = changes == 0;
        }

        debug!(iterations, converged, "label propagation finished");
        let membership: Vec<usize> = nodes.iter().map(|&u| labels[u as usize]).collect();
        Ok(LabelPropagationResult {
            communities: group_communities(graph, &nodes, &membership),
            iterations,
            converged,
        })
    }
}
