/*!
Single-source shortest paths.

[`ShortestPathTree`] is the common result of all single-source algorithms: it stores one distance
and one predecessor per node handle. Dijkstra lives in this module, while
[`bellman_ford`](super::bellman_ford), [`floyd_warshall`](super::floyd_warshall) and
[`astar`](super::astar) provide the remaining algorithms. All of them are accessible through the
[`ShortestPaths`] trait.

Ties are broken by strict improvement only: among several shortest paths, the predecessor that was
settled first is kept.
*/

use fxhash::FxHashMap;

use super::*;

/// A path given by its node keys and total weight
#[derive(Debug, Clone, PartialEq)]
pub struct Path<K> {
    pub distance: Weight,
    pub nodes: Vec<K>,
}

/// Distances and predecessors from a single source.
#[derive(Debug, Clone)]
pub struct ShortestPathTree<'a, G> {
    graph: &'a G,
    source: Node,
    distances: Vec<Weight>,
    predecessors: Vec<Option<OptionalNode>>,
}

impl<'a, G> ShortestPathTree<'a, G>
where
    G: AdjacencyList + NodeKeys,
{
    pub(crate) fn new(
        graph: &'a G,
        source: Node,
        distances: Vec<Weight>,
        predecessors: Vec<Option<OptionalNode>>,
    ) -> Self {
        Self {
            graph,
            source,
            distances,
            predecessors,
        }
    }

    /// Returns the key of the source node
    pub fn source(&self) -> &G::Key {
        self.graph.key_of(self.source)
    }

    /// Returns the distance of handle `u`; `INFINITY` if unreached
    pub fn distance_of(&self, u: Node) -> Weight {
        self.distances[u as usize]
    }

    /// Returns the predecessor of handle `u` on its shortest path
    pub fn predecessor_of_node(&self, u: Node) -> Option<Node> {
        self.predecessors[u as usize].map(|p| p.get())
    }

    /// Returns the distance to `target`; `INFINITY` if it is unreachable
    pub fn distance_to(&self, target: &G::Key) -> Result<Weight> {
        Ok(self.distance_of(self.graph.try_node_of(target)?))
    }

    /// Returns the predecessor of `target` on its shortest path.
    /// `None` for the source and unreachable nodes.
    pub fn predecessor_of(&self, target: &G::Key) -> Result<Option<&G::Key>> {
        let t = self.graph.try_node_of(target)?;
        Ok(self.predecessor_of_node(t).map(|p| self.graph.key_of(p)))
    }

    /// Returns the predecessor map of all reached nodes except the source
    pub fn predecessors(&self) -> FxHashMap<G::Key, G::Key> {
        self.graph
            .vertices()
            .filter_map(|u| {
                let p = self.predecessor_of_node(u)?;
                Some((self.graph.key_of(u).clone(), self.graph.key_of(p).clone()))
            })
            .collect()
    }

    /// Returns the distances of all reached nodes
    pub fn distances(&self) -> FxHashMap<G::Key, Weight> {
        self.graph
            .vertices()
            .filter(|&u| self.distances[u as usize].is_finite())
            .map(|u| (self.graph.key_of(u).clone(), self.distances[u as usize]))
            .collect()
    }

    /// Returns the handles on the path from the source to `t`, or `None` if `t` was not reached.
    /// Returns `None` as well if the predecessors do not lead back to the source, which can
    /// only happen in the presence of negative cycles.
    pub fn path_nodes(&self, t: Node) -> Option<Vec<Node>> {
        if !self.distances[t as usize].is_finite() {
            return None;
        }

        let mut path = vec![t];
        let mut u = t;
        while u != self.source {
            u = self.predecessor_of_node(u)?;
            path.push(u);
            if path.len() > self.graph.len() {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }

    /// Returns the shortest path from the source to `target` or `None` if it is unreachable
    pub fn path_to(&self, target: &G::Key) -> Result<Option<Path<G::Key>>> {
        let t = self.graph.try_node_of(target)?;
        Ok(self.path_nodes(t).map(|nodes| Path {
            distance: self.distances[t as usize],
            nodes: self.graph.keys_of(nodes),
        }))
    }
}

/// Dijkstra's algorithm for graphs with non-negative weights.
///
/// Uses a [`PriorityQueue`] with re-insertion: improved nodes are enqueued again and stale entries
/// are skipped on dequeue. Negative weights are detected when the respective edge is relaxed and
/// reported as [`GraphError::InvalidOperation`].
///
/// # Example
/// ```
/// use wgraphs::{prelude::*, algo::*};
///
/// let mut g: Graph<&str> = Graph::directed();
/// g.add_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 5.0)]).unwrap();
///
/// let tree = Dijkstra::new().run(&g, &"A").unwrap();
/// assert_eq!(tree.distance_to(&"C").unwrap(), 3.0);
/// assert_eq!(tree.predecessor_of(&"C").unwrap(), Some(&"B"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Dijkstra<'a, K> {
    stop_at: Option<&'a K>,
}

impl<K> Default for Dijkstra<'_, K> {
    fn default() -> Self {
        Self { stop_at: None }
    }
}

impl<'a, K: NodeKey> Dijkstra<'a, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops as soon as `target` is settled. Distances of other nodes might not be final then.
    pub fn set_stop_at(&mut self, target: &'a K) {
        self.stop_at = Some(target);
    }

    /// Stops as soon as `target` is settled. Distances of other nodes might not be final then.
    pub fn stop_at(mut self, target: &'a K) -> Self {
        self.set_stop_at(target);
        self
    }

    /// Runs Dijkstra from `source`
    pub fn run<'g, G>(&self, graph: &'g G, source: &K) -> Result<ShortestPathTree<'g, G>>
    where
        G: AdjacencyList + NodeKeys<Key = K>,
    {
        let s = graph.try_node_of(source)?;
        let stop = self.stop_at.map(|t| graph.try_node_of(t)).transpose()?;

        let (distances, predecessors) = dijkstra_from(graph, s, stop)?;
        Ok(ShortestPathTree::new(graph, s, distances, predecessors))
    }
}

/// Handle-level Dijkstra returning distance and predecessor arrays
pub(crate) fn dijkstra_from<G>(
    graph: &G,
    source: Node,
    stop: Option<Node>,
) -> Result<(Vec<Weight>, Vec<Option<OptionalNode>>)>
where
    G: AdjacencyList + NodeKeys,
{
    let mut distances = vec![Weight::INFINITY; graph.node_bound()];
    let mut predecessors = vec![None; graph.node_bound()];
    let mut settled = graph.vertex_bitset_unset();

    let mut queue = PriorityQueue::new();
    distances[source as usize] = 0.0;
    queue.enqueue(source, 0.0);

    while let Some((u, dist)) = queue.dequeue() {
        if settled.set_bit(u) {
            continue;
        }
        if stop == Some(u) {
            break;
        }

        for e in graph.out_edges_of(u) {
            ensure_operation!(
                e.weight >= 0.0,
                "Dijkstra does not support negative weight {} on edge ({:?}, {:?})",
                e.weight,
                graph.key_of(e.source),
                graph.key_of(e.target)
            );

            let v = e.target as usize;
            let candidate = dist + e.weight;
            if candidate < distances[v] {
                distances[v] = candidate;
                predecessors[v] = OptionalNode::new(u);
                queue.enqueue(e.target, candidate);
            }
        }
    }

    Ok((distances, predecessors))
}

/// Hop-count shortest path using BFS
fn bfs_path<G>(graph: &G, s: Node, t: Node) -> Option<Path<G::Key>>
where
    G: AdjacencyList + NodeKeys,
{
    let mut predecessors = vec![None; graph.node_bound()];
    let mut hops = None;
    for visit in graph.bfs(s).stop_at(t) {
        predecessors[visit.node as usize] = visit.predecessor;
        if visit.node == t {
            hops = Some(visit.depth);
        }
    }

    let hops = hops?;
    let mut nodes = vec![t];
    let mut u = t;
    while let Some(p) = predecessors[u as usize] {
        nodes.push(p);
        u = p;
    }
    nodes.reverse();

    Some(Path {
        distance: hops as Weight,
        nodes: graph.keys_of(nodes),
    })
}

/// Provides shortest path algorithms directly on graphs
pub trait ShortestPaths: AdjacencyList + NodeKeys {
    /// Returns a path with the minimum number of edges (weights are ignored)
    fn bfs_shortest_path(
        &self,
        source: &Self::Key,
        target: &Self::Key,
    ) -> Result<Option<Path<Self::Key>>> {
        let s = self.try_node_of(source)?;
        let t = self.try_node_of(target)?;
        Ok(bfs_path(self, s, t))
    }

    /// Runs [`Dijkstra`] from `source` with default configuration
    fn dijkstra(&self, source: &Self::Key) -> Result<ShortestPathTree<'_, Self>> {
        Dijkstra::new().run(self, source)
    }

    /// Returns a minimum weight path using [`Dijkstra`] that stops once `target` is settled
    fn dijkstra_path(
        &self,
        source: &Self::Key,
        target: &Self::Key,
    ) -> Result<Option<Path<Self::Key>>> {
        Dijkstra::new()
            .stop_at(target)
            .run(self, source)?
            .path_to(target)
    }

    /// Runs Bellman-Ford from `source`; see [`BellmanFordResult`]
    fn bellman_ford(&self, source: &Self::Key) -> Result<BellmanFordResult<'_, Self>> {
        let s = self.try_node_of(source)?;
        Ok(bellman_ford_from(self, s))
    }

    /// Returns a minimum weight path using Bellman-Ford.
    ///
    /// Fails with [`GraphError::InvalidOperation`] if a negative cycle is reachable from `source`
    fn bellman_ford_path(
        &self,
        source: &Self::Key,
        target: &Self::Key,
    ) -> Result<Option<Path<Self::Key>>> {
        self.try_node_of(target)?;
        let result = self.bellman_ford(source)?;
        ensure_operation!(
            !result.has_negative_cycle,
            "negative cycle reachable from {source:?}"
        );
        result.tree.path_to(target)
    }

    /// Returns *true* if the graph contains a cycle of negative total weight anywhere.
    /// An undirected edge with negative weight is a negative cycle on its own.
    fn has_negative_cycle(&self) -> bool {
        negative_cycle_exists(self)
    }

    /// Computes all-pairs shortest paths; see [`FloydWarshall`]
    fn floyd_warshall(&self) -> FloydWarshall<'_, Self> {
        FloydWarshall::new(self)
    }

    /// Runs A* from `source` to `target` guided by `heuristic`; see [`astar_path`]
    fn astar<H>(
        &self,
        source: &Self::Key,
        target: &Self::Key,
        heuristic: H,
    ) -> Result<Option<Path<Self::Key>>>
    where
        H: Fn(&Self::Key) -> Weight,
    {
        astar_path(self, source, target, heuristic)
    }
}

impl<G: AdjacencyList + NodeKeys> ShortestPaths for G {}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::testing::*;

    #[test]
    fn weighted_path() {
        let mut g: Graph<&str> = Graph::directed();
        g.add_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 5.0)])
            .unwrap();

        assert_eq!(
            g.dijkstra_path(&"A", &"C").unwrap(),
            Some(Path {
                distance: 3.0,
                nodes: vec!["A", "B", "C"]
            })
        );
        assert_eq!(g.dijkstra_path(&"C", &"A").unwrap(), None);

        assert_eq!(
            g.bfs_shortest_path(&"A", &"C").unwrap(),
            Some(Path {
                distance: 1.0,
                nodes: vec!["A", "C"]
            })
        );
        assert_eq!(
            g.bfs_shortest_path(&"A", &"A").unwrap().map(|p| p.nodes),
            Some(vec!["A"])
        );
    }

    #[test]
    fn tree_queries() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 4.0), (0, 2, 1.0), (2, 1, 2.0), (1, 3, 1.0), (5, 6, 1.0)])
            .unwrap();

        let tree = g.dijkstra(&0).unwrap();
        assert_eq!(tree.source(), &0);
        assert_eq!(tree.distance_to(&1).unwrap(), 3.0);
        assert_eq!(tree.distance_to(&3).unwrap(), 4.0);
        assert_eq!(tree.distance_to(&5).unwrap(), Weight::INFINITY);
        assert_eq!(tree.predecessor_of(&0).unwrap(), None);
        assert_eq!(tree.predecessor_of(&3).unwrap(), Some(&1));
        assert_eq!(tree.path_to(&6).unwrap(), None);
        assert!(tree.distance_to(&42).is_err());

        let preds = tree.predecessors();
        assert_eq!(preds.len(), 3);
        assert_eq!(preds[&1], 2);

        let distances = tree.distances();
        assert_eq!(distances.len(), 4);
        assert_eq!(distances[&0], 0.0);
    }

    #[test]
    fn first_settled_predecessor_wins() {
        let mut g: Graph<u32> = Graph::undirected();
        g.add_edges([(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)])
            .unwrap();

        let tree = g.dijkstra(&0).unwrap();
        assert_eq!(tree.predecessor_of(&3).unwrap(), Some(&1));
    }

    #[test]
    fn negative_weights_are_rejected() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 1.0), (1, 2, -1.0)]).unwrap();
        assert!(matches!(
            g.dijkstra(&0),
            Err(GraphError::InvalidOperation(_))
        ));

        // unreachable negative edges are never relaxed
        assert!(g.dijkstra(&2).is_ok());
        assert!(matches!(g.dijkstra(&3), Err(GraphError::NodeNotFound(_))));
    }

    #[test]
    fn stop_at_target() {
        let mut g: Graph<u32> = Graph::directed();
        g.add_edges([(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]).unwrap();

        let tree = Dijkstra::new().stop_at(&1).run(&g, &0).unwrap();
        assert_eq!(tree.distance_to(&1).unwrap(), 1.0);
        assert_eq!(tree.distance_to(&3).unwrap(), Weight::INFINITY);
        assert!(Dijkstra::new().stop_at(&7).run(&g, &0).is_err());
    }

    #[test]
    fn algorithms_agree() {
        let rng = &mut Pcg64Mcg::seed_from_u64(4);
        for directed in [false, true] {
            for _ in 0..10 {
                let g = random_weighted_graph(rng, 30, 0.1, directed);
                let all_pairs = g.floyd_warshall();
                assert!(!all_pairs.has_negative_cycle());

                for s in g.nodes() {
                    let dijkstra = g.dijkstra(s).unwrap();
                    let bellman_ford = g.bellman_ford(s).unwrap();
                    assert!(!bellman_ford.has_negative_cycle);

                    for t in g.nodes() {
                        let d = dijkstra.distance_to(t).unwrap();
                        assert_close(d, bellman_ford.tree.distance_to(t).unwrap());
                        assert_close(d, all_pairs.distance(s, t).unwrap());

                        if let Some(path) = dijkstra.path_to(t).unwrap() {
                            let weight: Weight = path
                                .nodes
                                .windows(2)
                                .map(|w| g.edge_weight(&w[0], &w[1]).unwrap())
                                .sum();
                            assert_close(weight, d);
                        }
                    }
                }
            }
        }
    }
}
