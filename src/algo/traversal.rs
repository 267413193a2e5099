/*!
Graph traversal algorithms and traversal-derived utilities.

This module provides:
- Lazy node-level iterators [`BreadthFirstSearch`] and [`DepthFirstSearch`] that every other
  algorithm family builds upon.
- Keyed searches ([`Traversal::breadth_first_search`], [`Traversal::depth_first_search`])
  returning the visited set, the visiting order and the search tree in terms of node keys.
- Topological ordering and cycle detection.

All searches use explicit stacks/queues, so the traversal depth is not bounded by the call stack.
*/

use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};

use super::*;

/// A node reported by [`BreadthFirstSearch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub node: Node,
    /// The node from which `node` was discovered; `None` for the start node
    pub predecessor: Option<Node>,
    /// Number of edges on the search-tree path from the start node
    pub depth: NumNodes,
}

/// Breadth-first search iterator.
///
/// Nodes are marked when they are enqueued, hence every reachable node is reported exactly once,
/// and the predecessor of a node is the first node it was discovered from.
/// Neighbors are explored in adjacency (insertion) order.
pub struct BreadthFirstSearch<'a, G> {
    graph: &'a G,
    visited: NodeBitSet,
    queue: VecDeque<Visit>,
    stop_at: Option<Node>,
}

impl<'a, G: AdjacencyList> BreadthFirstSearch<'a, G> {
    /// Creates a new BFS starting in `start`.
    /// ** Panics if `start` is not alive **
    pub fn new(graph: &'a G, start: Node) -> Self {
        assert!(graph.has_vertex(start));
        let mut visited = graph.vertex_bitset_unset();
        visited.set_bit(start);
        Self {
            graph,
            visited,
            queue: VecDeque::from(vec![Visit {
                node: start,
                predecessor: None,
                depth: 0,
            }]),
            stop_at: None,
        }
    }

    /// Sets a stopper node. If this node is reached, the iterator returns it and afterwards only None.
    pub fn set_stop_at(&mut self, stopper: Node) {
        self.stop_at = Some(stopper);
    }

    /// Sets a stopper node. If this node is reached, the iterator returns it and afterwards only None.
    pub fn stop_at(mut self, stopper: Node) -> Self {
        self.set_stop_at(stopper);
        self
    }

    /// Returns *true* if `u` was discovered so far
    pub fn did_visit_node(&self, u: Node) -> bool {
        self.visited.get_bit(u)
    }
}

impl<G: AdjacencyList> Iterator for BreadthFirstSearch<'_, G> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let visit = self.queue.pop_front()?;
        let u = visit.node;

        if self.stop_at == Some(u) {
            self.queue.clear();
        } else {
            for v in self.graph.neighbors_of(u) {
                if !self.visited.set_bit(v) {
                    self.queue.push_back(Visit {
                        node: v,
                        predecessor: Some(u),
                        depth: visit.depth + 1,
                    });
                }
            }
        }

        Some(visit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (
            self.queue.len(),
            Some(self.graph.len() + self.queue.len() - self.visited.cardinality() as usize),
        )
    }
}

/// Events reported by [`DepthFirstSearch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfsEvent {
    /// `node` is entered for the first time (pre-order)
    Discover { node: Node, parent: Option<Node> },
    /// All neighbors of `node` have been explored (post-order)
    Finish(Node),
}

struct Frame<'a> {
    node: Node,
    parent: Option<Node>,
    discovered: bool,
    neighbors: Box<dyn Iterator<Item = Node> + 'a>,
}

/// Depth-first search iterator.
///
/// Behaves exactly like the recursive formulation (`Discover` on entry, `Finish` on exit,
/// neighbors in adjacency order), but keeps an explicit stack of frames storing the node,
/// its parent and the position within its neighborhood.
pub struct DepthFirstSearch<'a, G> {
    graph: &'a G,
    visited: NodeBitSet,
    stack: Vec<Frame<'a>>,
}

impl<'a, G: AdjacencyList> DepthFirstSearch<'a, G> {
    /// Creates a new DFS starting in `start`.
    /// ** Panics if `start` is not alive **
    pub fn new(graph: &'a G, start: Node) -> Self {
        assert!(graph.has_vertex(start));
        let mut dfs = Self {
            graph,
            visited: graph.vertex_bitset_unset(),
            stack: Vec::new(),
        };
        dfs.push(start, None);
        dfs
    }

    fn push(&mut self, node: Node, parent: Option<Node>) {
        let graph = self.graph;
        self.visited.set_bit(node);
        self.stack.push(Frame {
            node,
            parent,
            discovered: false,
            neighbors: Box::new(graph.neighbors_of(node)),
        });
    }

    /// Tries to restart the search at an yet unvisited node (in handle order) and returns
    /// true iff successful. Requires that search came to a hold earlier,
    /// i.e. self.next() returned None
    pub fn try_restart_at_unvisited(&mut self) -> bool {
        assert!(self.stack.is_empty());
        match self.graph.vertices().find(|&u| !self.visited.get_bit(u)) {
            Some(u) => {
                self.push(u, None);
                true
            }
            None => false,
        }
    }

    /// Returns *true* if `u` was discovered so far
    pub fn did_visit_node(&self, u: Node) -> bool {
        self.visited.get_bit(u)
    }
}

impl<G: AdjacencyList> Iterator for DepthFirstSearch<'_, G> {
    type Item = DfsEvent;

    fn next(&mut self) -> Option<DfsEvent> {
        loop {
            let frame = self.stack.last_mut()?;
            if !frame.discovered {
                frame.discovered = true;
                return Some(DfsEvent::Discover {
                    node: frame.node,
                    parent: frame.parent,
                });
            }

            let u = frame.node;
            match frame.neighbors.next() {
                Some(v) => {
                    if !self.visited.get_bit(v) {
                        self.push(v, Some(u));
                    }
                }
                None => {
                    self.stack.pop();
                    return Some(DfsEvent::Finish(u));
                }
            }
        }
    }
}

/// Strategy of keyed depth-first searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DfsMode {
    /// Stack of pending nodes; a node is marked when popped and its neighbors are pushed in
    /// reverse order. Reports nodes in the same order as `RecursivePreOrder`.
    #[default]
    Iterative,
    /// Report nodes when they are entered
    RecursivePreOrder,
    /// Report nodes when they are left
    RecursivePostOrder,
}

/// Options of keyed searches
pub struct SearchOptions<'a, K> {
    stop_at: Option<&'a K>,
    visit: Option<&'a mut dyn FnMut(&K)>,
    mode: DfsMode,
}

impl<K> Default for SearchOptions<'_, K> {
    fn default() -> Self {
        Self {
            stop_at: None,
            visit: None,
            mode: DfsMode::default(),
        }
    }
}

impl<'a, K> SearchOptions<'a, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ends the search once `target` is reported
    pub fn set_stop_at(&mut self, target: &'a K) {
        self.stop_at = Some(target);
    }

    /// Ends the search once `target` is reported
    pub fn stop_at(mut self, target: &'a K) -> Self {
        self.set_stop_at(target);
        self
    }

    /// Calls `visit` for every reported node in order
    pub fn set_visit(&mut self, visit: &'a mut dyn FnMut(&K)) {
        self.visit = Some(visit);
    }

    /// Calls `visit` for every reported node in order
    pub fn visit(mut self, visit: &'a mut dyn FnMut(&K)) -> Self {
        self.set_visit(visit);
        self
    }

    /// Only affects depth-first searches
    pub fn set_mode(&mut self, mode: DfsMode) {
        self.mode = mode;
    }

    /// Only affects depth-first searches
    pub fn mode(mut self, mode: DfsMode) -> Self {
        self.set_mode(mode);
        self
    }
}

/// Result of a keyed search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<K: NodeKey> {
    /// All reported nodes
    pub visited: FxHashSet<K>,
    /// Reported nodes in the order they were reported
    pub order: Vec<K>,
    /// Maps every reported node except the start node to its parent in the search tree
    pub tree: FxHashMap<K, K>,
}

impl<K: NodeKey> SearchResult<K> {
    fn new() -> Self {
        Self {
            visited: FxHashSet::default(),
            order: Vec::new(),
            tree: FxHashMap::default(),
        }
    }
}

/// Collects reported handles into a [`SearchResult`] and handles stopping/callbacks
struct SearchRecorder<'a, 'o, G: NodeKeys> {
    graph: &'a G,
    result: SearchResult<G::Key>,
    stop_at: Option<Node>,
    visit: Option<&'o mut dyn FnMut(&G::Key)>,
}

impl<'a, 'o, G: NodeKeys> SearchRecorder<'a, 'o, G> {
    fn new(graph: &'a G, options: SearchOptions<'o, G::Key>) -> Result<Self> {
        let stop_at = options
            .stop_at
            .map(|key| graph.try_node_of(key))
            .transpose()?;

        Ok(Self {
            graph,
            result: SearchResult::new(),
            stop_at,
            visit: options.visit,
        })
    }

    /// Records `u` and returns *true* if the search has to stop
    fn report(&mut self, u: Node, parent: Option<Node>) -> bool {
        let key = self.graph.key_of(u);
        if let Some(visit) = self.visit.as_mut() {
            visit(key);
        }
        if let Some(p) = parent {
            self.result
                .tree
                .insert(key.clone(), self.graph.key_of(p).clone());
        }
        self.result.visited.insert(key.clone());
        self.result.order.push(key.clone());

        self.stop_at == Some(u)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Active,
    Done,
}

/// Provides traversal methods (BFS, DFS, topological order, cycle checks)
pub trait Traversal: AdjacencyList + NodeKeys {
    /// Returns an iterator that traverses nodes reachable from `start`
    /// in **breadth-first search (BFS) order**.
    ///
    /// # Examples
    /// ```
    /// use wgraphs::{prelude::*, algo::*};
    ///
    /// let mut g: Graph<u32> = Graph::undirected();
    /// g.add_edges([(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
    ///
    /// let order: Vec<_> = g.bfs(0).map(|v| (v.node, v.depth)).collect();
    /// assert_eq!(order, vec![(0, 0), (1, 1), (2, 2)]);
    /// ```
    fn bfs(&self, start: Node) -> BreadthFirstSearch<'_, Self> {
        BreadthFirstSearch::new(self, start)
    }

    /// Returns an iterator over the [`DfsEvent`]s of a depth-first search from `start`.
    fn dfs(&self, start: Node) -> DepthFirstSearch<'_, Self> {
        DepthFirstSearch::new(self, start)
    }

    /// Keyed breadth-first search from `start`.
    /// The mode of `options` is ignored.
    ///
    /// Fails with [`GraphError::NodeNotFound`] if `start` or the stopper are unknown.
    fn breadth_first_search(
        &self,
        start: &Self::Key,
        options: SearchOptions<'_, Self::Key>,
    ) -> Result<SearchResult<Self::Key>> {
        let s = self.try_node_of(start)?;
        let mut recorder = SearchRecorder::new(self, options)?;

        for visit in self.bfs(s) {
            if recorder.report(visit.node, visit.predecessor) {
                break;
            }
        }

        Ok(recorder.result)
    }

    /// Keyed depth-first search from `start` using the strategy given in `options`.
    ///
    /// Fails with [`GraphError::NodeNotFound`] if `start` or the stopper are unknown.
    fn depth_first_search(
        &self,
        start: &Self::Key,
        options: SearchOptions<'_, Self::Key>,
    ) -> Result<SearchResult<Self::Key>> {
        let s = self.try_node_of(start)?;
        let mode = options.mode;
        let mut recorder = SearchRecorder::new(self, options)?;

        match mode {
            DfsMode::Iterative => {
                let mut visited = self.vertex_bitset_unset();
                let mut stack = vec![(s, None)];
                let mut buffer = Vec::new();

                while let Some((u, parent)) = stack.pop() {
                    if visited.set_bit(u) {
                        continue;
                    }
                    if recorder.report(u, parent) {
                        break;
                    }

                    buffer.extend(self.neighbors_of(u).filter(|&v| !visited.get_bit(v)));
                    stack.extend(buffer.drain(..).rev().map(|v| (v, Some(u))));
                }
            }
            DfsMode::RecursivePreOrder => {
                for event in self.dfs(s) {
                    if let DfsEvent::Discover { node, parent } = event {
                        if recorder.report(node, parent) {
                            break;
                        }
                    }
                }
            }
            DfsMode::RecursivePostOrder => {
                let mut parents = FxHashMap::default();
                for event in self.dfs(s) {
                    match event {
                        DfsEvent::Discover { node, parent } => {
                            parents.insert(node, parent);
                        }
                        DfsEvent::Finish(node) => {
                            let parent = parents.get(&node).copied().flatten();
                            if recorder.report(node, parent) {
                                break;
                            }
                        }
                    }
                }
            }
        }

        Ok(recorder.result)
    }

    /// Returns the nodes of a directed graph in **topological order**, i.e. every edge `(u, v)`
    /// has `u` before `v`. The order is the reversed finishing order of a DFS that starts at
    /// every yet unvisited node in insertion order.
    ///
    /// Returns `Ok(None)` if the graph contains a cycle (including self-loops) and fails with
    /// [`GraphError::InvalidOperation`] on undirected graphs.
    fn topological_sort(&self) -> Result<Option<Vec<Self::Key>>> {
        ensure_operation!(
            self.is_directed(),
            "topological sort requires a directed graph"
        );

        let Some(order) = topological_order(self) else {
            return Ok(None);
        };
        Ok(Some(self.keys_of(order)))
    }

    /// Returns *true* if the graph contains a cycle.
    /// Dispatches to [`Traversal::has_directed_cycle`] or [`Traversal::has_undirected_cycle`].
    fn has_cycle(&self) -> bool {
        if self.is_directed() {
            directed_cycle_exists(self)
        } else {
            undirected_cycle_exists(self)
        }
    }

    /// Returns *true* if a directed graph contains a cycle (self-loops included).
    /// Nodes on the current DFS path are tracked; reaching one of them again closes a cycle.
    ///
    /// Fails with [`GraphError::InvalidOperation`] on undirected graphs.
    fn has_directed_cycle(&self) -> Result<bool> {
        ensure_operation!(self.is_directed(), "graph is undirected");
        Ok(directed_cycle_exists(self))
    }

    /// Returns *true* if an undirected graph contains a cycle (self-loops included).
    /// The edge leading back to the DFS parent is ignored; any other edge to an already
    /// discovered node closes a cycle.
    ///
    /// Fails with [`GraphError::InvalidOperation`] on directed graphs.
    fn has_undirected_cycle(&self) -> Result<bool> {
        ensure_operation!(self.is_undirected(), "graph is directed");
        Ok(undirected_cycle_exists(self))
    }
}

impl<G: AdjacencyList + NodeKeys> Traversal for G {}

/// Reversed DFS finishing order if it is a valid topological order
fn topological_order<G: AdjacencyList>(graph: &G) -> Option<Vec<Node>> {
    let mut order = Vec::with_capacity(graph.len());
    if let Some(start) = graph.vertices().next() {
        let mut dfs = DepthFirstSearch::new(graph, start);
        loop {
            order.extend(dfs.by_ref().filter_map(|event| match event {
                DfsEvent::Finish(u) => Some(u),
                DfsEvent::Discover { .. } => None,
            }));
            if !dfs.try_restart_at_unvisited() {
                break;
            }
        }
    }
    order.reverse();

    let mut position = vec![0usize; graph.node_bound()];
    for (i, &u) in order.iter().enumerate() {
        position[u as usize] = i;
    }

    let is_sorted = graph
        .edge_records()
        .all(|e| position[e.source as usize] < position[e.target as usize]);

    is_sorted.then_some(order)
}

fn directed_cycle_exists<G: AdjacencyList>(graph: &G) -> bool {
    let mut marks = vec![Mark::New; graph.node_bound()];

    for s in graph.vertices() {
        if marks[s as usize] != Mark::New {
            continue;
        }

        marks[s as usize] = Mark::Active;
        let mut stack: Vec<(Node, Box<dyn Iterator<Item = Node> + '_>)> =
            vec![(s, Box::new(graph.neighbors_of(s)))];

        while let Some((u, neighbors)) = stack.last_mut() {
            match neighbors.next() {
                Some(v) => match marks[v as usize] {
                    Mark::Active => return true,
                    Mark::New => {
                        marks[v as usize] = Mark::Active;
                        stack.push((v, Box::new(graph.neighbors_of(v))));
                    }
                    Mark::Done => {}
                },
                None => {
                    marks[*u as usize] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    false
}

fn undirected_cycle_exists<G: AdjacencyList>(graph: &G) -> bool {
    let mut visited = graph.vertex_bitset_unset();

    for s in graph.vertices() {
        if visited.set_bit(s) {
            continue;
        }

        let mut stack = vec![(s, None)];
        while let Some((u, parent)) = stack.pop() {
            for v in graph.neighbors_of(u) {
                if Some(v) == parent {
                    continue;
                }
                if visited.set_bit(v) {
                    return true;
                }
                stack.push((v, Some(u)));
            }
        }
    }

    false
}
