use fxhash::FxHashMap;
use itertools::Either;

use super::*;
use crate::error::ensure_operation;

/// Structural switches of a [`Graph`]. They are fixed once the graph is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    directed: bool,
    allow_self_loops: bool,
    allow_parallel_edges: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            directed: false,
            allow_self_loops: true,
            allow_parallel_edges: false,
        }
    }
}

impl GraphConfig {
    /// Creates the default configuration: undirected, self-loops allowed, parallel edges rejected
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether edges have an orientation
    pub fn set_directed(&mut self, directed: bool) {
        self.directed = directed;
    }

    /// Sets whether edges have an orientation
    pub fn directed(mut self, directed: bool) -> Self {
        self.set_directed(directed);
        self
    }

    /// Sets whether edges `(u, u)` may be inserted
    pub fn set_allow_self_loops(&mut self, allow: bool) {
        self.allow_self_loops = allow;
    }

    /// Sets whether edges `(u, u)` may be inserted
    pub fn allow_self_loops(mut self, allow: bool) -> Self {
        self.set_allow_self_loops(allow);
        self
    }

    /// Sets whether re-inserting an existing edge is allowed.
    /// If so, the weight and payload of the existing edge are replaced.
    pub fn set_allow_parallel_edges(&mut self, allow: bool) {
        self.allow_parallel_edges = allow;
    }

    /// Sets whether re-inserting an existing edge is allowed.
    /// If so, the weight and payload of the existing edge are replaced.
    pub fn allow_parallel_edges(mut self, allow: bool) -> Self {
        self.set_allow_parallel_edges(allow);
        self
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn allows_self_loops(&self) -> bool {
        self.allow_self_loops
    }

    pub fn allows_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }
}

#[derive(Debug, Clone)]
struct NodeSlot<K, N> {
    key: K,
    data: N,
}

/// A labelled, weighted graph.
///
/// - `K` identifies nodes from the outside,
/// - `N` is the payload attached to every node,
/// - `E` is the payload attached to every edge.
///
/// Every node is assigned a [`Node`] handle in insertion order. Removed nodes leave an empty
/// slot behind, so handles stay stable for the lifetime of the graph.
///
/// # Example
/// ```
/// use wgraphs::prelude::*;
///
/// let mut graph: Graph<&str> = Graph::undirected();
/// graph.add_edge("A", "B", 1.0).unwrap();
/// graph.add_edge("B", "C", 2.0).unwrap();
///
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.degree(&"B").unwrap(), 2);
/// assert_eq!(graph.edge_weight(&"C", &"B"), Some(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Graph<K, N = (), E = ()> {
    config: GraphConfig,
    keys: FxHashMap<K, Node>,
    slots: Vec<Option<NodeSlot<K, N>>>,
    out_nbs: Vec<Neighborhood<EdgeRecord<E>>>,
    in_nbs: Vec<Neighborhood<Node>>,
    num_nodes: NumNodes,
    num_edges: NumEdges,
}

impl<K: NodeKey, N, E> Graph<K, N, E> {
    /// Creates an empty graph with the given configuration
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            keys: FxHashMap::default(),
            slots: Vec::new(),
            out_nbs: Vec::new(),
            in_nbs: Vec::new(),
            num_nodes: 0,
            num_edges: 0,
        }
    }

    /// Creates an empty undirected graph with default configuration
    pub fn undirected() -> Self {
        Self::new(GraphConfig::new())
    }

    /// Creates an empty directed graph with otherwise default configuration
    pub fn directed() -> Self {
        Self::new(GraphConfig::new().directed(true))
    }

    /// Returns the configuration this graph was created with
    pub fn config(&self) -> GraphConfig {
        self.config
    }

    /// Adds a node with the given payload and returns its handle.
    /// If the key already exists, its payload is kept and `data` is dropped.
    ///
    /// ** Panics if the graph already has `2^32 - 1` node slots **
    pub fn add_node_with_data(&mut self, key: K, data: N) -> Node {
        if let Some(&u) = self.keys.get(&key) {
            return u;
        }

        assert!(
            self.slots.len() < INVALID_NODE as usize,
            "number of node slots exceeds Node-Range"
        );
        let u = self.slots.len() as Node;

        self.keys.insert(key.clone(), u);
        self.slots.push(Some(NodeSlot { key, data }));
        self.out_nbs.push(Neighborhood::new());
        if self.config.directed {
            self.in_nbs.push(Neighborhood::new());
        }
        self.num_nodes += 1;
        u
    }

    /// Adds a node with a default payload and returns its handle.
    /// Adding an existing key is a non-op.
    pub fn add_node(&mut self, key: K) -> Node
    where
        N: Default,
    {
        if let Some(&u) = self.keys.get(&key) {
            return u;
        }
        self.add_node_with_data(key, N::default())
    }

    /// Adds the edge `(source, target)` with the given weight and payload. Missing endpoints are
    /// created with a default payload.
    ///
    /// Fails with [`GraphError::InvalidOperation`] if the edge is a self-loop and self-loops are not
    /// allowed, or if the edge exists and parallel edges are not allowed. In both cases, the graph
    /// is left unchanged. If parallel edges are allowed, an existing edge gets its weight and payload
    /// replaced.
    pub fn add_edge_with_data(&mut self, source: K, target: K, weight: Weight, data: E) -> Result<()>
    where
        N: Default,
        E: Clone,
    {
        ensure_operation!(
            source != target || self.config.allow_self_loops,
            "self-loop at {source:?} is not allowed"
        );
        if !self.config.allow_parallel_edges {
            ensure_operation!(
                !self.has_edge(&source, &target),
                "edge ({source:?}, {target:?}) already exists and parallel edges are not allowed"
            );
        }

        let u = self.add_node(source);
        let v = self.add_node(target);
        self.link(u, v, weight, data);
        Ok(())
    }

    /// Adds the edge `(source, target)` with the given weight and a default payload.
    /// See [`Graph::add_edge_with_data`] for failure modes.
    pub fn add_edge(&mut self, source: K, target: K, weight: Weight) -> Result<()>
    where
        N: Default,
        E: Clone + Default,
    {
        self.add_edge_with_data(source, target, weight, E::default())
    }

    /// Adds multiple weighted edges. Stops at the first edge that cannot be inserted.
    pub fn add_edges<I>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, K, Weight)>,
        N: Default,
        E: Clone + Default,
    {
        for (source, target, weight) in edges {
            self.add_edge(source, target, weight)?;
        }
        Ok(())
    }

    /// Inserts an edge between alive handles without checking the configuration.
    /// Returns *true* if an existing edge was replaced.
    fn link(&mut self, u: Node, v: Node, weight: Weight, data: E) -> bool
    where
        E: Clone,
    {
        if !self.config.directed && u != v {
            self.out_nbs[v as usize].insert(EdgeRecord {
                source: v,
                target: u,
                weight,
                data: data.clone(),
            });
        }
        if self.config.directed {
            self.in_nbs[v as usize].insert(u);
        }

        let replaced = self.out_nbs[u as usize]
            .insert(EdgeRecord {
                source: u,
                target: v,
                weight,
                data,
            })
            .is_some();

        if !replaced {
            self.num_edges += 1;
        }
        replaced
    }

    /// Removes the edge `(source, target)` and returns *true* if it existed
    pub fn remove_edge(&mut self, source: &K, target: &K) -> bool {
        let (Some(u), Some(v)) = (self.node_of(source), self.node_of(target)) else {
            return false;
        };

        if self.out_nbs[u as usize].remove(v).is_none() {
            return false;
        }

        if self.config.directed {
            self.in_nbs[v as usize].remove(u);
        } else if u != v {
            self.out_nbs[v as usize].remove(u);
        }

        self.num_edges -= 1;
        true
    }

    /// Removes a node and all edges touching it. Returns *true* if the node existed.
    pub fn remove_node(&mut self, key: &K) -> bool {
        let Some(u) = self.keys.remove(key) else {
            return false;
        };

        let out = std::mem::take(&mut self.out_nbs[u as usize]);
        for e in out.iter() {
            if e.target != u {
                if self.config.directed {
                    self.in_nbs[e.target as usize].remove(u);
                } else {
                    self.out_nbs[e.target as usize].remove(u);
                }
            }
            self.num_edges -= 1;
        }

        if self.config.directed {
            let inc = std::mem::take(&mut self.in_nbs[u as usize]);
            // self-loops were already removed with the outgoing edges
            for w in inc.neighbors().filter(|&w| w != u) {
                self.out_nbs[w as usize].remove(u);
                self.num_edges -= 1;
            }
        }

        self.slots[u as usize] = None;
        self.num_nodes -= 1;
        true
    }

    /// Returns the number of nodes
    pub fn node_count(&self) -> usize {
        self.num_nodes as usize
    }

    /// Returns the number of logical edges
    pub fn edge_count(&self) -> usize {
        self.num_edges as usize
    }

    /// Returns an iterator over all node keys in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots.iter().flatten().map(|slot| &slot.key)
    }

    /// Returns an iterator over all logical edges.
    /// Undirected edges are reported once, oriented from the earlier inserted endpoint.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_, K, E>> + '_ {
        self.edge_records().map(|e| EdgeView {
            source: self.key_of(e.source),
            target: self.key_of(e.target),
            weight: e.weight,
            data: &e.data,
        })
    }

    /// Returns *true* if the key is part of the graph
    pub fn has_node(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }

    /// Returns *true* if the edge `(source, target)` exists
    pub fn has_edge(&self, source: &K, target: &K) -> bool {
        self.edge_record(source, target).is_some()
    }

    fn edge_record(&self, source: &K, target: &K) -> Option<&EdgeRecord<E>> {
        self.edge_of(self.node_of(source)?, self.node_of(target)?)
    }

    /// Returns the weight of the edge `(source, target)` if it exists
    pub fn edge_weight(&self, source: &K, target: &K) -> Option<Weight> {
        self.edge_record(source, target).map(|e| e.weight)
    }

    /// Returns the payload of the edge `(source, target)` if it exists
    pub fn edge_data(&self, source: &K, target: &K) -> Option<&E> {
        self.edge_record(source, target).map(|e| &e.data)
    }

    /// Returns the payload of a node if it exists
    pub fn node_data(&self, key: &K) -> Option<&N> {
        let u = self.node_of(key)?;
        self.slots[u as usize].as_ref().map(|slot| &slot.data)
    }

    /// Returns a mutable reference to the payload of a node if it exists
    pub fn node_data_mut(&mut self, key: &K) -> Option<&mut N> {
        let u = self.node_of(key)?;
        self.slots[u as usize].as_mut().map(|slot| &mut slot.data)
    }

    /// Returns an iterator over the (outgoing) neighbors of a node
    pub fn neighbors(&self, key: &K) -> Result<impl Iterator<Item = &K> + '_> {
        let u = self.try_node_of(key)?;
        Ok(self.neighbors_of(u).map(|v| self.key_of(v)))
    }

    /// Returns an iterator over the outgoing neighbors of a node
    pub fn out_neighbors(&self, key: &K) -> Result<impl Iterator<Item = &K> + '_> {
        self.neighbors(key)
    }

    /// Returns an iterator over the incoming neighbors of a node.
    /// Equals [`Graph::neighbors`] for undirected graphs.
    pub fn in_neighbors(&self, key: &K) -> Result<impl Iterator<Item = &K> + '_> {
        let u = self.try_node_of(key)?;
        Ok(self.in_neighbors_of(u).map(|v| self.key_of(v)))
    }

    /// Returns the degree of a node; see [`AdjacencyList::degree_of`]
    pub fn degree(&self, key: &K) -> Result<NumNodes> {
        Ok(self.degree_of(self.try_node_of(key)?))
    }

    pub fn in_degree(&self, key: &K) -> Result<NumNodes> {
        Ok(self.in_degree_of(self.try_node_of(key)?))
    }

    pub fn out_degree(&self, key: &K) -> Result<NumNodes> {
        Ok(self.out_degree_of(self.try_node_of(key)?))
    }

    /// Returns a new graph in which every directed edge is reversed.
    /// An undirected graph yields an identical copy.
    pub fn transpose(&self) -> Self
    where
        N: Clone,
        E: Clone,
    {
        if !self.config.directed {
            return self.clone();
        }

        let mut transposed = Self::new(self.config);
        let mut handles = vec![INVALID_NODE; self.node_bound()];
        for slot in self.slots.iter().flatten() {
            let u = transposed.add_node_with_data(slot.key.clone(), slot.data.clone());
            handles[self.keys[&slot.key] as usize] = u;
        }

        for e in self.edge_records() {
            transposed.link(
                handles[e.target as usize],
                handles[e.source as usize],
                e.weight,
                e.data.clone(),
            );
        }

        transposed
    }
}

impl<K: NodeKey, N, E> Default for Graph<K, N, E> {
    fn default() -> Self {
        Self::undirected()
    }
}

impl<K, N, E> GraphType for Graph<K, N, E> {
    fn is_directed(&self) -> bool {
        self.config.directed
    }
}

impl<K, N, E> GraphNodeOrder for Graph<K, N, E> {
    fn number_of_nodes(&self) -> NumNodes {
        self.num_nodes
    }

    fn node_bound(&self) -> usize {
        self.slots.len()
    }

    fn vertices(&self) -> impl Iterator<Item = Node> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(u, _)| u as Node)
    }

    fn has_vertex(&self, u: Node) -> bool {
        self.slots.get(u as usize).is_some_and(Option::is_some)
    }
}

impl<K, N, E> GraphEdgeOrder for Graph<K, N, E> {
    fn number_of_edges(&self) -> NumEdges {
        self.num_edges
    }
}

impl<K: NodeKey, N, E> NodeKeys for Graph<K, N, E> {
    type Key = K;

    fn key_of(&self, u: Node) -> &K {
        match &self.slots[u as usize] {
            Some(slot) => &slot.key,
            None => panic!("node {u} has been removed"),
        }
    }

    fn node_of(&self, key: &K) -> Option<Node> {
        self.keys.get(key).copied()
    }
}

impl<K, N, E> AdjacencyList for Graph<K, N, E> {
    type EdgeData = E;

    fn out_edges_of(&self, u: Node) -> impl Iterator<Item = &EdgeRecord<E>> + '_ {
        self.out_nbs[u as usize].iter()
    }

    fn in_edges_of(&self, u: Node) -> impl Iterator<Item = &EdgeRecord<E>> + '_ {
        if self.config.directed {
            Either::Left(
                self.in_nbs[u as usize]
                    .neighbors()
                    .filter_map(move |w| self.out_nbs[w as usize].get(u)),
            )
        } else {
            Either::Right(
                self.out_nbs[u as usize]
                    .iter()
                    .filter_map(move |e| self.out_nbs[e.target as usize].get(u)),
            )
        }
    }

    fn in_neighbors_of(&self, u: Node) -> impl Iterator<Item = Node> + '_ {
        if self.config.directed {
            Either::Left(self.in_nbs[u as usize].neighbors())
        } else {
            Either::Right(self.out_nbs[u as usize].neighbors())
        }
    }

    fn edge_of(&self, u: Node, v: Node) -> Option<&EdgeRecord<E>> {
        self.out_nbs.get(u as usize)?.get(v)
    }

    fn out_degree_of(&self, u: Node) -> NumNodes {
        self.out_nbs[u as usize].len() as NumNodes
    }

    fn in_degree_of(&self, u: Node) -> NumNodes {
        if self.config.directed {
            self.in_nbs[u as usize].len() as NumNodes
        } else {
            self.out_degree_of(u)
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn triangle() -> Graph<&'static str> {
        let mut graph = Graph::undirected();
        graph
            .add_edges([("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 1.0)])
            .unwrap();
        graph
    }

    #[test]
    fn undirected_edges_are_mirrored() {
        let graph = triangle();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        assert!(graph.has_edge(&"C", &"B"));
        assert_eq!(graph.neighbors(&"A").unwrap().collect_vec(), vec![&"B", &"C"]);
        assert_eq!(graph.in_neighbors(&"A").unwrap().collect_vec(), vec![&"B", &"C"]);
        assert_eq!(graph.degree(&"B").unwrap(), 2);
        assert_eq!(graph.in_degree(&"B").unwrap(), 2);

        let edges = graph
            .edges()
            .map(|e| (*e.source, *e.target))
            .collect_vec();
        assert_eq!(edges, vec![("A", "B"), ("A", "C"), ("B", "C")]);
    }

    #[test]
    fn directed_degrees() {
        let mut graph: Graph<u32> = Graph::directed();
        graph
            .add_edges([(0, 1, 1.0), (0, 2, 1.0), (2, 0, 1.0), (1, 1, 1.0)])
            .unwrap();

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.out_degree(&0).unwrap(), 2);
        assert_eq!(graph.in_degree(&0).unwrap(), 1);
        assert_eq!(graph.degree(&0).unwrap(), 3);
        assert_eq!(graph.degree(&1).unwrap(), 3);
        assert_eq!(graph.in_neighbors(&0).unwrap().collect_vec(), vec![&2]);
        assert_eq!(graph.neighbors(&2).unwrap().collect_vec(), vec![&0]);
        assert!(graph.has_edge(&2, &0));
        assert!(!graph.has_edge(&1, &0));
    }

    #[test]
    fn self_loops_are_stored_once() {
        let mut graph: Graph<char> = Graph::undirected();
        graph.add_edge('a', 'a', 2.0).unwrap();
        graph.add_edge('a', 'b', 1.0).unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(&'a').unwrap(), 2);
        assert_eq!(graph.edges().count(), 2);

        assert!(graph.remove_node(&'a'));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree(&'b').unwrap(), 0);
    }

    #[test]
    fn configuration_is_enforced() {
        let mut graph: Graph<u8> = Graph::new(GraphConfig::new().allow_self_loops(false));
        assert!(matches!(
            graph.add_edge(1, 1, 1.0),
            Err(GraphError::InvalidOperation(_))
        ));
        assert_eq!(graph.node_count(), 0);

        graph.add_edge(1, 2, 1.0).unwrap();
        assert!(matches!(
            graph.add_edge(2, 1, 5.0),
            Err(GraphError::InvalidOperation(_))
        ));
        assert_eq!(graph.edge_weight(&1, &2), Some(1.0));

        let mut graph: Graph<u8> = Graph::new(GraphConfig::new().allow_parallel_edges(true));
        graph.add_edge(1, 2, 1.0).unwrap();
        graph.add_edge(2, 1, 5.0).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight(&1, &2), Some(5.0));
    }

    #[test]
    fn unknown_nodes() {
        let graph = triangle();
        assert_eq!(
            graph.neighbors(&"X").err(),
            Some(GraphError::NodeNotFound("\"X\"".into()))
        );
        assert!(graph.degree(&"X").is_err());
        assert!(graph.edge_weight(&"A", &"X").is_none());
        assert!(!graph.has_edge(&"X", &"A"));
    }

    #[test]
    fn removal_cascades() {
        let mut graph: Graph<u32> = Graph::directed();
        graph
            .add_edges([(0, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0), (2, 2, 1.0), (3, 2, 1.0)])
            .unwrap();

        assert!(graph.remove_edge(&3, &2));
        assert!(!graph.remove_edge(&3, &2));
        assert_eq!(graph.edge_count(), 4);

        assert!(graph.remove_node(&2));
        assert!(!graph.remove_node(&2));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.out_degree(&1).unwrap(), 0);
        assert_eq!(graph.in_degree(&1).unwrap(), 1);

        // handles are not reused
        let u = graph.add_node(7);
        assert_eq!(u, 4);
        assert_eq!(graph.node_bound(), 5);
        assert_eq!(graph.vertices().collect_vec(), vec![0, 1, 3, 4]);
        assert_eq!(graph.nodes().copied().collect_vec(), vec![0, 1, 3, 7]);
    }

    #[test]
    fn payloads() {
        let mut graph: Graph<&str, u32, String> = Graph::undirected();
        graph.add_node_with_data("A", 3);
        assert_eq!(graph.add_node_with_data("A", 5), 0);
        assert_eq!(graph.node_data(&"A"), Some(&3));

        if let Some(data) = graph.node_data_mut(&"A") {
            *data += 1;
        }
        assert_eq!(graph.node_data(&"A"), Some(&4));

        graph
            .add_edge_with_data("A", "B", 2.5, "road".to_string())
            .unwrap();
        assert_eq!(graph.edge_data(&"B", &"A").map(String::as_str), Some("road"));
        assert_eq!(graph.node_data(&"B"), Some(&0));
    }

    #[test]
    fn clone_round_trip() {
        let graph = triangle();
        let mut copy = graph.clone();

        assert_eq!(graph.nodes().collect_vec(), copy.nodes().collect_vec());
        let edges = |g: &Graph<&'static str>| {
            g.edges()
                .map(|e| (*e.source, *e.target, e.weight))
                .collect_vec()
        };
        assert_eq!(edges(&graph), edges(&copy));
        assert_eq!(copy.config(), graph.config());

        copy.add_edge("C", "D", 1.0).unwrap();
        assert!(copy.remove_edge(&"A", &"B"));
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.has_edge(&"A", &"B"));
        assert!(!graph.has_node(&"D"));
    }

    #[test]
    fn transpose() {
        let mut graph: Graph<&str> = Graph::directed();
        graph
            .add_edges([("A", "B", 1.0), ("B", "C", 2.0), ("C", "C", 3.0)])
            .unwrap();
        graph.remove_node(&"A");
        graph.add_edge("D", "B", 4.0).unwrap();

        let transposed = graph.transpose();
        assert_eq!(transposed.edge_count(), 3);
        assert_eq!(transposed.edge_weight(&"C", &"B"), Some(2.0));
        assert_eq!(transposed.edge_weight(&"B", &"D"), Some(4.0));
        assert_eq!(transposed.edge_weight(&"C", &"C"), Some(3.0));
        assert!(!transposed.has_edge(&"B", &"C"));
        assert_eq!(transposed.in_degree(&"D").unwrap(), 1);

        let undirected = triangle();
        assert_eq!(undirected.transpose().edge_count(), 3);
    }
}
