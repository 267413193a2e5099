use fxhash::FxHashMap;
use tracing::{debug, trace};

use super::*;

/// Result of [`PageRank::run`]. The ranks sum up to `1`.
#[derive(Debug, Clone)]
pub struct PageRankResult<K> {
    pub ranks: Scores<K>,
    pub iterations: usize,
    pub converged: bool,
}

/// PageRank for directed graphs.
///
/// Each iteration distributes a node's rank evenly (or proportional to edge weight if `weighted`)
/// among its out-neighbors, scaled by `damping_factor`. The rank of nodes without out-edges and
/// the teleport probability `1 - damping_factor` are redistributed according to the
/// personalization vector, which defaults to the uniform distribution.
///
/// # Example
/// ```
/// use wgraphs::{prelude::*, algo::*};
///
/// let mut g: Graph<&str> = Graph::directed();
/// g.add_edges([("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0), ("D", "A", 1.0)]).unwrap();
///
/// let result = PageRank::new().damping_factor(0.9).run(&g).unwrap();
/// assert!(result.converged);
/// assert!(result.ranks[&"A"] > result.ranks[&"D"]);
/// ```
#[derive(Debug, Clone)]
pub struct PageRank<K> {
    damping_factor: f64,
    max_iterations: usize,
    tolerance: f64,
    personalization: Option<FxHashMap<K, f64>>,
    weighted: bool,
}

impl<K> Default for PageRank<K> {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
            personalization: None,
            weighted: false,
        }
    }
}

impl<K: NodeKey> PageRank<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probability to follow an out-edge instead of teleporting; must be in `[0, 1]`
    pub fn set_damping_factor(&mut self, damping_factor: f64) {
        self.damping_factor = damping_factor;
    }

    /// Probability to follow an out-edge instead of teleporting; must be in `[0, 1]`
    pub fn damping_factor(mut self, damping_factor: f64) -> Self {
        self.set_damping_factor(damping_factor);
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

    /// Teleport distribution over node keys. Values are normalized to sum up to `1`;
    /// nodes that do not appear receive nothing.
    pub fn set_personalization<I>(&mut self, personalization: I)
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        self.personalization = Some(personalization.into_iter().collect());
    }

    /// Teleport distribution over node keys. Values are normalized to sum up to `1`;
    /// nodes that do not appear receive nothing.
    pub fn personalization<I>(mut self, personalization: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        self.set_personalization(personalization);
        self
    }

    pub fn set_weighted(&mut self, weighted: bool) {
        self.weighted = weighted;
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.set_weighted(weighted);
        self
    }

    /// Builds the normalized teleport vector indexed by node handle
    fn teleport_vector<G>(&self, graph: &G) -> Result<Vec<f64>>
    where
        G: NodeKeys<Key = K>,
    {
        let mut teleport = vec![0.0; graph.node_bound()];

        let Some(personalization) = &self.personalization else {
            let uniform = 1.0 / graph.number_of_nodes() as f64;
            for u in graph.vertices() {
                teleport[u as usize] = uniform;
            }
            return Ok(teleport);
        };

        ensure_parameter!(
            !personalization.is_empty(),
            "personalization must not be empty"
        );
        for (key, &value) in personalization {
            let u = graph.try_node_of(key)?;
            ensure_parameter!(
                value.is_finite() && value >= 0.0,
                "personalization of {key:?} must be non-negative, got {value}"
            );
            teleport[u as usize] = value;
        }

        let total: f64 = teleport.iter().sum();
        ensure_parameter!(total > 0.0, "personalization must not sum up to zero");
        for x in &mut teleport {
            *x /= total;
        }

        Ok(teleport)
    }

    /// Fails with [`GraphError::InvalidOperation`] on undirected graphs or negative weights in
    /// weighted mode, and with [`GraphError::InvalidParameter`] on an invalid damping factor or
    /// personalization.
    pub fn run<G>(&self, graph: &G) -> Result<PageRankResult<K>>
    where
        G: AdjacencyList + NodeKeys<Key = K>,
    {
        ensure_operation!(graph.is_directed(), "PageRank requires a directed graph");
        ensure_parameter!(
            self.damping_factor.is_valid_probability(),
            "damping factor must be in [0, 1], got {}",
            self.damping_factor
        );
        ensure_operation!(
            !self.weighted || !graph.has_negative_weights(),
            "weighted PageRank does not support negative weights"
        );

        if graph.is_empty() {
            return Ok(PageRankResult {
                ranks: Scores::default(),
                iterations: 0,
                converged: true,
            });
        }

        let teleport = self.teleport_vector(graph)?;
        let out_weight: Vec<f64> = (0..graph.node_bound())
            .map(|u| {
                let u = u as Node;
                if !graph.has_vertex(u) {
                    0.0
                } else if self.weighted {
                    graph.out_edges_of(u).map(|e| e.weight).sum()
                } else {
                    graph.out_degree_of(u) as f64
                }
            })
            .collect();

        let n = graph.number_of_nodes() as f64;
        let mut ranks = vec![0.0; graph.node_bound()];
        for u in graph.vertices() {
            ranks[u as usize] = 1.0 / n;
        }
        let mut next = ranks.clone();

        let d = self.damping_factor;
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            iterations += 1;

            let dangling: f64 = graph
                .vertices()
                .filter(|&u| out_weight[u as usize] == 0.0)
                .map(|u| ranks[u as usize])
                .sum();
            let redistributed = d * dangling + (1.0 - d);

            for v in graph.vertices() {
                let incoming: f64 = graph
                    .in_edges_of(v)
                    .filter(|e| out_weight[e.source as usize] > 0.0)
                    .map(|e| {
                        let share = if self.weighted { e.weight } else { 1.0 };
                        ranks[e.source as usize] * share / out_weight[e.source as usize]
                    })
                    .sum();
                next[v as usize] = d * incoming + redistributed * teleport[v as usize];
            }

            let delta = max_delta(graph, &ranks, &next);
            std::mem::swap(&mut ranks, &mut next);
            trace!(iteration = iterations, delta, dangling, "PageRank");

            if delta < self.tolerance {
                converged = true;
                break;
            }
        }

        debug!(iterations, converged, "PageRank finished");
        Ok(PageRankResult {
            ranks: scores_of(graph, &ranks),
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
    fn cycle_is_uniform() {
        let mut g: Graph<u32> = Graph::directed();
        g.connect_cycle([0, 1, 2]).unwrap();

        let result = g.pagerank().unwrap();
        assert!(result.converged);
        for u in 0..3 {
            assert_near(result.ranks[&u], 1.0 / 3.0);
        }
    }

    #[test]
    fn dangling_nodes() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 1.0), (0, 2, 1.0)]).unwrap();

        let result = g.pagerank().unwrap();
        assert!(result.converged);
        assert_near(result.ranks.values().sum(), 1.0);
        assert_near(result.ranks[&1], result.ranks[&2]);
        assert!(result.ranks[&1] > result.ranks[&0]);
    }

    #[test]
    fn personalization_and_weights() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 3.0), (0, 2, 1.0), (1, 0, 1.0), (2, 0, 1.0), (3, 0, 1.0)])
            .unwrap();

        let plain = g.pagerank().unwrap();
        assert_near(plain.ranks[&1], plain.ranks[&2]);

        let weighted = PageRank::new().weighted(true).run(&g).unwrap();
        assert!(weighted.ranks[&1] > weighted.ranks[&2]);
        assert_near(weighted.ranks.values().sum(), 1.0);

        let personalized = PageRank::new()
            .personalization([(2, 1.0)])
            .run(&g)
            .unwrap();
        assert!(personalized.ranks[&2] > personalized.ranks[&1]);
        assert_near(personalized.ranks[&3], 0.0);
    }

    #[test]
    fn soft_non_convergence() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (0, 2, 1.0)])
            .unwrap();

        let result = PageRank::new().max_iterations(2).run(&g).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.ranks.len(), 3);
    }

    #[test]
    fn invalid_input() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edge(0, 1, 1.0).unwrap();
        assert!(matches!(g.pagerank(), Err(GraphError::InvalidOperation(_))));

        let mut g2: Graph<u32> = Graph::directed();
        g2.add_edges([(0, 1, -1.0), (1, 0, 2.0)]).unwrap();

        assert!(matches!(
            PageRank::new().damping_factor(1.5).run(&g2),
            Err(GraphError::InvalidParameter(_))
        ));
        assert!(matches!(
            PageRank::new()
                .personalization(Vec::<(u32, f64)>::new())
                .run(&g2),
            Err(GraphError::InvalidParameter(_))
        ));
        assert!(matches!(
            PageRank::new().personalization([(7, 1.0)]).run(&g2),
            Err(GraphError::NodeNotFound(_))
        ));
        assert!(matches!(
            PageRank::new().weighted(true).run(&g2),
            Err(GraphError::InvalidOperation(_))
        ));
        assert!(g2.pagerank().is_ok());
    }
}
