use std::collections::VecDeque;

use fxhash::FxHashMap;
use smallvec::SmallVec;

use super::*;

/// Relative difference below which two path lengths are considered equal
const DISTANCE_TOLERANCE: f64 = 1e-10;

/// Edge centrality scores keyed by `(source, target)`.
/// Undirected edges appear once, oriented by node insertion order.
pub type EdgeScores<K> = FxHashMap<(K, K), f64>;

/// Shared state of Brandes' algorithm for one source at a time
struct Brandes<'a, G> {
    graph: &'a G,
    weighted: bool,
    /// Nodes in non-decreasing distance from the source
    order: Vec<Node>,
    predecessors: Vec<SmallVec<[Node; 4]>>,
    sigma: Vec<f64>,
    distances: Vec<Weight>,
    delta: Vec<f64>,
}

impl<'a, G> Brandes<'a, G>
where
    G: AdjacencyList + NodeKeys,
{
    fn new(graph: &'a G, weighted: bool) -> Self {
        let n = graph.node_bound();
        Self {
            graph,
            weighted,
            order: Vec::with_capacity(n),
            predecessors: vec![SmallVec::new(); n],
            sigma: vec![0.0; n],
            distances: vec![Weight::INFINITY; n],
            delta: vec![0.0; n],
        }
    }

    /// Counts shortest paths from `s` and records predecessors
    fn count_paths(&mut self, s: Node) -> Result<()> {
        for &u in &self.order {
            self.predecessors[u as usize].clear();
            self.sigma[u as usize] = 0.0;
            self.distances[u as usize] = Weight::INFINITY;
            self.delta[u as usize] = 0.0;
        }
        self.order.clear();

        self.sigma[s as usize] = 1.0;
        self.distances[s as usize] = 0.0;

        if self.weighted {
            self.count_weighted_paths(s)
        } else {
            self.count_unweighted_paths(s);
            Ok(())
        }
    }

    fn count_unweighted_paths(&mut self, s: Node) {
        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            self.order.push(v);
            let next = self.distances[v as usize] + 1.0;

            for w in self.graph.neighbors_of(v) {
                let wi = w as usize;
                if self.distances[wi].is_infinite() {
                    self.distances[wi] = next;
                    queue.push_back(w);
                }
                if self.distances[wi] == next {
                    self.sigma[wi] += self.sigma[v as usize];
                    self.predecessors[wi].push(v);
                }
            }
        }
    }

    fn count_weighted_paths(&mut self, s: Node) -> Result<()> {
        let mut settled = self.graph.vertex_bitset_unset();
        let mut queue = PriorityQueue::new();
        queue.enqueue(s, 0.0);

        while let Some((v, _)) = queue.dequeue() {
            if settled.set_bit(v) {
                continue;
            }
            self.order.push(v);
            let dist = self.distances[v as usize];

            for e in self.graph.out_edges_of(v) {
                ensure_operation!(
                    e.weight >= 0.0,
                    "weighted betweenness does not support negative weight {} on edge ({:?}, {:?})",
                    e.weight,
                    self.graph.key_of(e.source),
                    self.graph.key_of(e.target)
                );

                let w = e.target;
                if w == v || settled.get_bit(w) {
                    continue;
                }

                let wi = w as usize;
                let candidate = dist + e.weight;
                // path lengths within rounding error count as equally short
                let slack = DISTANCE_TOLERANCE * candidate.abs().max(1.0);
                if candidate < self.distances[wi] - slack {
                    self.distances[wi] = candidate;
                    self.sigma[wi] = self.sigma[v as usize];
                    self.predecessors[wi].clear();
                    self.predecessors[wi].push(v);
                    queue.enqueue(w, candidate);
                } else if (candidate - self.distances[wi]).abs() <= slack {
                    self.sigma[wi] += self.sigma[v as usize];
                    self.predecessors[wi].push(v);
                }
            }
        }

        Ok(())
    }

    /// Back-propagates dependencies in reverse distance order.
    /// `on_edge(v, w, c)` receives the dependency `c` flowing over the shortest-path edge `(v, w)`.
    fn accumulate<F: FnMut(Node, Node, f64)>(&mut self, mut on_edge: F) {
        for &w in self.order.iter().rev() {
            let wi = w as usize;
            let coeff = (1.0 + self.delta[wi]) / self.sigma[wi];
            for &v in &self.predecessors[wi] {
                let c = self.sigma[v as usize] * coeff;
                self.delta[v as usize] += c;
                on_edge(v, w, c);
            }
        }
    }
}

/// Betweenness centrality by Brandes' algorithm.
///
/// Shortest paths are counted with BFS or, if `weighted`, with Dijkstra (weights must then be
/// non-negative). On undirected graphs every pair is discovered from both endpoints, so the raw
/// values are halved.
///
/// With `normalized`, scores are divided by the number of ordered pairs `(n-1)(n-2)` for
/// directed graphs or by half of it for undirected graphs. If `endpoints` is set, the endpoints
/// of each path are counted as well and `n(n-1)` replaces `(n-1)(n-2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetweennessCentrality {
    normalized: bool,
    endpoints: bool,
    weighted: bool,
}

impl BetweennessCentrality {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_normalized(&mut self, normalized: bool) {
        self.normalized = normalized;
    }

    pub fn normalized(mut self, normalized: bool) -> Self {
        self.set_normalized(normalized);
        self
    }

    pub fn set_endpoints(&mut self, endpoints: bool) {
        self.endpoints = endpoints;
    }

    pub fn endpoints(mut self, endpoints: bool) -> Self {
        self.set_endpoints(endpoints);
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
        let mut scores = vec![0.0; graph.node_bound()];
        let mut brandes = Brandes::new(graph, self.weighted);

        for s in graph.vertices() {
            brandes.count_paths(s)?;
            brandes.accumulate(|_, _, _| {});

            if self.endpoints {
                scores[s as usize] += (brandes.order.len() - 1) as f64;
            }
            for &w in &brandes.order[1..] {
                scores[w as usize] += brandes.delta[w as usize];
                if self.endpoints {
                    scores[w as usize] += 1.0;
                }
            }
        }

        let n = graph.number_of_nodes() as f64;
        let pairs = if self.endpoints {
            n * (n - 1.0)
        } else {
            (n - 1.0) * (n - 2.0)
        };
        let scale = if self.normalized && pairs > 0.0 {
            1.0 / pairs
        } else if graph.is_undirected() {
            0.5
        } else {
            1.0
        };
        for u in graph.vertices() {
            scores[u as usize] *= scale;
        }

        Ok(scores_of(graph, &scores))
    }
}

/// Edge betweenness centrality by Brandes' algorithm.
///
/// Every edge appears in the result, even if no shortest path uses it. Normalization divides by
/// `n(n-1)` for directed graphs or by half of it for undirected graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeBetweennessCentrality {
    normalized: bool,
    weighted: bool,
}

impl EdgeBetweennessCentrality {
    pub fn new() -> Self {
        Self::default()
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

    pub fn run<G>(&self, graph: &G) -> Result<EdgeScores<G::Key>>
    where
        G: AdjacencyList + NodeKeys,
    {
        let directed = graph.is_directed();
        let canonical = |u: Node, v: Node| {
            if directed || u <= v { (u, v) } else { (v, u) }
        };

        let mut scores: FxHashMap<(Node, Node), f64> = graph
            .edge_records()
            .map(|e| ((e.source, e.target), 0.0))
            .collect();

        let mut brandes = Brandes::new(graph, self.weighted);
        for s in graph.vertices() {
            brandes.count_paths(s)?;
            brandes.accumulate(|v, w, c| {
                if let Some(score) = scores.get_mut(&canonical(v, w)) {
                    *score += c;
                }
            });
        }

        let n = graph.number_of_nodes() as f64;
        let pairs = n * (n - 1.0);
        let scale = if self.normalized && pairs > 0.0 {
            1.0 / pairs
        } else if directed {
            1.0
        } else {
            0.5
        };

        Ok(scores
            .into_iter()
            .map(|((u, v), score)| {
                (
                    (graph.key_of(u).clone(), graph.key_of(v).clone()),
                    score * scale,
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{SeedableRng, seq::SliceRandom};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{gens::*, testing::*};

    #[test]
    fn path_and_star() {
        let mut g: Graph<&str> = Graph::undirected();
        g.connect_path(["A", "B", "C"]).unwrap();

        let scores = g.betweenness_centrality().unwrap();
        assert_close(scores[&"A"], 0.0);
        assert_close(scores[&"B"], 1.0);

        let scores = BetweennessCentrality::new().normalized(true).run(&g).unwrap();
        assert_close(scores[&"B"], 1.0);

        let scores = BetweennessCentrality::new().endpoints(true).run(&g).unwrap();
        assert_close(scores[&"A"], 2.0);
        assert_close(scores[&"B"], 3.0);

        let mut star: Graph<u32> = Graph::undirected();
        star.add_edges((1..5).map(|v| (0, v, 1.0))).unwrap();
        let scores = star.betweenness_centrality().unwrap();
        assert_close(scores[&0], 6.0);
        let scores = BetweennessCentrality::new()
            .normalized(true)
            .run(&star)
            .unwrap();
        assert_close(scores[&0], 1.0);
        assert_close(scores[&1], 0.0);
    }

    #[test]
    fn directed_path() {
        let mut g: Graph<u32> = Graph::directed();
        g.connect_path([0, 1, 2]).unwrap();

        let scores = g.betweenness_centrality().unwrap();
        assert_close(scores[&1], 1.0);

        let edges = g.edge_betweenness_centrality().unwrap();
        assert_close(edges[&(0, 1)], 2.0);
        assert_close(edges[&(1, 2)], 2.0);

        let edges = EdgeBetweennessCentrality::new()
            .normalized(true)
            .run(&g)
            .unwrap();
        assert_close(edges[&(0, 1)], 1.0 / 3.0);
    }

    #[test]
    fn weighted_paths() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 1.0), (1, 3, 1.0), (0, 2, 1.0), (2, 3, 1.0), (0, 3, 5.0)])
            .unwrap();

        let hops = g.betweenness_centrality().unwrap();
        assert_close(hops[&0], 0.5);
        assert_close(hops[&1], 0.0);

        let weighted = BetweennessCentrality::new().weighted(true).run(&g).unwrap();
        for u in 0..4 {
            assert_close(weighted[&u], 0.5);
        }

        let edges = EdgeBetweennessCentrality::new()
            .weighted(true)
            .run(&g)
            .unwrap();
        assert_eq!(edges.len(), 5);
        assert_close(edges[&(0, 3)], 0.0);
        assert_close(edges[&(0, 1)], 2.0);

        g.add_edge(4, 0, -1.0).unwrap();
        assert!(BetweennessCentrality::new().weighted(true).run(&g).is_err());
    }

    #[test]
    fn rounded_path_lengths_tie() {
        let mut g: Graph<char> = Graph::undirected();
        // 0.1 + 0.2 != 0.3 in floating point
        g.add_edges([('a', 'b', 0.1), ('b', 'c', 0.2), ('a', 'c', 0.3)])
            .unwrap();

        let scores = BetweennessCentrality::new().weighted(true).run(&g).unwrap();
        assert_close(scores[&'a'], 0.0);
        assert_close(scores[&'b'], 0.5);
        assert_close(scores[&'c'], 0.0);
    }

    #[test]
    fn undirected_edges_keyed_once() {
        let mut g: Graph<&str> = Graph::undirected();
        g.connect_path(["A", "B", "C"]).unwrap();

        let edges = g.edge_betweenness_centrality().unwrap();
        assert_eq!(edges.len(), 2);
        assert_close(edges[&("A", "B")], 2.0);
        assert_close(edges[&("B", "C")], 2.0);
    }

    #[test]
    fn undirected_symmetry() {
        let rng = &mut Pcg64Mcg::seed_from_u64(11);
        for _ in 0..5 {
            let g = random_graph(rng, 40, 0.1, false);

            let mut edges = g
                .edges()
                .map(|e| (*e.source, *e.target, e.weight))
                .collect_vec();
            edges.shuffle(rng);

            let mut shuffled: Graph<Node> = Graph::undirected();
            let mut both_ways: Graph<Node> = Graph::directed();
            for u in g.nodes() {
                shuffled.add_node(*u);
                both_ways.add_node(*u);
            }
            for &(u, v, w) in &edges {
                shuffled.add_edge(v, u, w).unwrap();
                both_ways.add_edge(u, v, w).unwrap();
                both_ways.add_edge(v, u, w).unwrap();
            }

            let scores = g.betweenness_centrality().unwrap();
            let reordered = shuffled.betweenness_centrality().unwrap();
            let directed = both_ways.betweenness_centrality().unwrap();

            for u in g.nodes() {
                assert_close(scores[u], reordered[u]);
                assert_close(scores[u], directed[u] / 2.0);
            }

            let sum: f64 = scores.values().sum();
            let directed_sum: f64 = directed.values().sum();
            assert_close(sum, directed_sum / 2.0);
        }
    }
}
