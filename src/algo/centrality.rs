/*!
# Node Centrality

Every centrality measure is a configuration struct with a `run` method that returns one score
per node key. The most common variants are also available on the graph itself via the
[`Centrality`] trait:

```rust
use wgraphs::{prelude::*, algo::*};

let mut g: Graph<&str> = Graph::undirected();
g.add_edges([("A", "B", 1.0), ("B", "C", 1.0)]).unwrap();

let scores = g.betweenness_centrality().unwrap();
assert_eq!(scores[&"B"], 1.0);
```

Degree and closeness centrality live in this module; betweenness, the spectral measures,
PageRank and HITS have their own submodules.
*/

use fxhash::FxHashMap;

use super::*;

/// Centrality scores keyed by node
pub type Scores<K> = FxHashMap<K, f64>;

/// Result of an iterative centrality measure.
///
/// Non-convergence is not an error: `scores` then holds the values after the last iteration.
#[derive(Debug, Clone)]
pub struct CentralityResult<K> {
    pub scores: Scores<K>,
    pub iterations: usize,
    pub converged: bool,
}

/// Collects per-handle values into keyed scores
pub(crate) fn scores_of<G: NodeKeys>(graph: &G, values: &[f64]) -> Scores<G::Key> {
    graph
        .vertices()
        .map(|u| (graph.key_of(u).clone(), values[u as usize]))
        .collect()
}

/// Returns the maximum coordinate-wise difference of two score vectors restricted to alive nodes
pub(crate) fn max_delta<G: GraphNodeOrder>(graph: &G, a: &[f64], b: &[f64]) -> f64 {
    graph
        .vertices()
        .map(|u| (a[u as usize] - b[u as usize]).abs())
        .fold(0.0, f64::max)
}

/// Scales `values` to unit L2-norm over alive nodes; leaves a zero vector untouched
pub(crate) fn l2_normalize<G: GraphNodeOrder>(graph: &G, values: &mut [f64]) {
    let norm = graph
        .vertices()
        .map(|u| values[u as usize] * values[u as usize])
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        for u in graph.vertices() {
            values[u as usize] /= norm;
        }
    }
}

/// Distances from handle `s` in hops or (with `weighted`) by Dijkstra
pub(crate) fn distances_from<G>(graph: &G, s: Node, weighted: bool) -> Result<Vec<Weight>>
where
    G: AdjacencyList + NodeKeys,
{
    if weighted {
        return Ok(dijkstra_from(graph, s, None)?.0);
    }

    let mut distances = vec![Weight::INFINITY; graph.node_bound()];
    for visit in graph.bfs(s) {
        distances[visit.node as usize] = visit.depth as Weight;
    }
    Ok(distances)
}

/// Which edges are counted by [`DegreeCentrality`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    In,
    Out,
    /// Sum of in- and out-degree; equals the degree on undirected graphs
    #[default]
    Total,
}

/// Degree centrality, optionally normalized by `n - 1`.
///
/// On undirected graphs every [`Direction`] yields the plain degree.
#[derive(Debug, Clone, Copy)]
pub struct DegreeCentrality {
    direction: Direction,
    normalized: bool,
}

impl Default for DegreeCentrality {
    fn default() -> Self {
        Self {
            direction: Direction::Total,
            normalized: true,
        }
    }
}

impl DegreeCentrality {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.set_direction(direction);
        self
    }

    pub fn set_normalized(&mut self, normalized: bool) {
        self.normalized = normalized;
    }

    pub fn normalized(mut self, normalized: bool) -> Self {
        self.set_normalized(normalized);
        self
    }

    pub fn run<G>(&self, graph: &G) -> Scores<G::Key>
    where
        G: AdjacencyList + NodeKeys,
    {
        let n = graph.number_of_nodes();
        let scale = if self.normalized && n > 1 {
            1.0 / (n - 1) as f64
        } else {
            1.0
        };

        graph
            .vertices()
            .map(|u| {
                let degree = if graph.is_undirected() {
                    graph.degree_of(u)
                } else {
                    match self.direction {
                        Direction::In => graph.in_degree_of(u),
                        Direction::Out => graph.out_degree_of(u),
                        Direction::Total => graph.degree_of(u),
                    }
                };
                (graph.key_of(u).clone(), degree as f64 * scale)
            })
            .collect()
    }
}

/// Closeness centrality based on outgoing distances.
///
/// - standard: `1 / sum(d(u, v))` over all reachable `v`; normalized by multiplying with `n - 1`
/// - harmonic: `sum(1 / d(u, v))` over all reachable `v`; normalized by dividing by `n - 1`
///
/// Unreachable nodes are skipped and a node that reaches nothing scores `0`.
/// Weighted distances are computed with Dijkstra and thus require non-negative weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosenessCentrality {
    harmonic: bool,
    normalized: bool,
    weighted: bool,
}

impl ClosenessCentrality {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_harmonic(&mut self, harmonic: bool) {
        self.harmonic = harmonic;
    }

    pub fn harmonic(mut self, harmonic: bool) -> Self {
        self.set_harmonic(harmonic);
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

    pub fn run<G>(&self, graph: &G) -> Result<Scores<G::Key>>
    where
        G: AdjacencyList + NodeKeys,
    {
        let n = graph.number_of_nodes() as f64;
        let mut scores = Scores::default();

        for u in graph.vertices() {
            let distances = distances_from(graph, u, self.weighted)?;
            let reachable = graph
                .vertices()
                .filter(|&v| v != u)
                .map(|v| distances[v as usize])
                .filter(|d| d.is_finite() && *d > 0.0);

            let score = if self.harmonic {
                let sum: f64 = reachable.map(|d| 1.0 / d).sum();
                if self.normalized && n > 1.0 {
                    sum / (n - 1.0)
                } else {
                    sum
                }
            } else {
                let sum: f64 = reachable.sum();
                if sum == 0.0 {
                    0.0
                } else if self.normalized {
                    (n - 1.0) / sum
                } else {
                    1.0 / sum
                }
            };

            scores.insert(graph.key_of(u).clone(), score);
        }

        Ok(scores)
    }
}

/// Centrality measures with default configuration directly on graphs
pub trait Centrality: AdjacencyList + NodeKeys {
    /// Total degree normalized by `n - 1`; see [`DegreeCentrality`]
    fn degree_centrality(&self) -> Scores<Self::Key> {
        DegreeCentrality::new().run(self)
    }

    /// Unnormalized standard closeness in hops; see [`ClosenessCentrality`]
    fn closeness_centrality(&self) -> Result<Scores<Self::Key>> {
        ClosenessCentrality::new().run(self)
    }

    /// Unnormalized harmonic closeness in hops; see [`ClosenessCentrality`]
    fn harmonic_centrality(&self) -> Result<Scores<Self::Key>> {
        ClosenessCentrality::new().harmonic(true).run(self)
    }

    /// Unnormalized, unweighted betweenness; see [`BetweennessCentrality`]
    fn betweenness_centrality(&self) -> Result<Scores<Self::Key>> {
        BetweennessCentrality::new().run(self)
    }

    /// Unnormalized, unweighted edge betweenness; see [`EdgeBetweennessCentrality`]
    fn edge_betweenness_centrality(&self) -> Result<EdgeScores<Self::Key>> {
        EdgeBetweennessCentrality::new().run(self)
    }

    /// See [`EigenvectorCentrality`]
    fn eigenvector_centrality(&self) -> CentralityResult<Self::Key> {
        EigenvectorCentrality::new().run(self)
    }

    /// See [`KatzCentrality`]
    fn katz_centrality(&self) -> Result<CentralityResult<Self::Key>> {
        KatzCentrality::new().run(self)
    }

    /// See [`PageRank`]; fails on undirected graphs
    fn pagerank(&self) -> Result<PageRankResult<Self::Key>> {
        PageRank::new().run(self)
    }

    /// See [`Hits`]
    fn hits(&self) -> HitsResult<Self::Key> {
        Hits::new().run(self)
    }
}

impl<G: AdjacencyList + NodeKeys> Centrality for G {}
