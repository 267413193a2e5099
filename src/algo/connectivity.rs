use std::iter::FusedIterator;

use fxhash::FxHashMap;
use itertools::Itertools;
use tracing::debug;

use super::*;

/// Connected components, strongly connected components and the condensation graph
pub trait Connectivity: AdjacencyList + NodeKeys {
    /// Returns the connected components of an undirected graph using a [`UnionFind`] over all
    /// edges. Components are ordered by their first node in insertion order, and so are their
    /// members.
    ///
    /// Fails with [`GraphError::InvalidOperation`] on directed graphs; see
    /// [`Connectivity::weakly_connected_components`] instead.
    fn connected_components(&self) -> Result<Vec<Vec<Self::Key>>> {
        ensure_operation!(
            self.is_undirected(),
            "connected components require an undirected graph"
        );
        Ok(self.weakly_connected_components())
    }

    /// Returns the connected components when ignoring edge directions.
    /// Ordered as in [`Connectivity::connected_components`].
    fn weakly_connected_components(&self) -> Vec<Vec<Self::Key>> {
        let components = union_find_components(self);
        debug!(components = components.len(), "connected components");

        components
            .into_iter()
            .map(|nodes| self.keys_of(nodes))
            .collect()
    }

    /// Returns *true* if every node can reach every other node when ignoring edge directions.
    /// The empty graph is considered connected.
    fn is_connected(&self) -> bool {
        let Some(start) = self.vertices().next() else {
            return true;
        };

        let mut visited = self.vertex_bitset_unset();
        let mut stack = vec![start];
        visited.set_bit(start);
        while let Some(u) = stack.pop() {
            let neighbors = self
                .neighbors_of(u)
                .chain(self.in_neighbors_of(u).filter(|_| self.is_directed()));
            for v in neighbors {
                if !visited.set_bit(v) {
                    stack.push(v);
                }
            }
        }

        visited.cardinality() as usize == self.len()
    }

    /// Returns the strongly connected components using Tarjan's algorithm.
    ///
    /// Components are ordered by the discovery of their root when starting searches from nodes
    /// in insertion order. Members of each component appear in discovery order, starting with
    /// the root.
    ///
    /// Fails with [`GraphError::InvalidOperation`] on undirected graphs.
    fn strongly_connected_components(&self) -> Result<Vec<Vec<Self::Key>>> {
        let components = sccs_by_discovery(self)?;
        debug!(components = components.len(), "strongly connected components");

        Ok(components
            .into_iter()
            .map(|nodes| self.keys_of(nodes))
            .collect())
    }

    /// Contracts every strongly connected component into a single node.
    ///
    /// The result is a directed graph whose node `i` represents the `i`-th component of
    /// [`Connectivity::strongly_connected_components`] and carries its members as payload.
    /// An edge `(i, j)` exists if any edge leads from component `i` to component `j != i`; its
    /// weight is the minimum weight of all such edges.
    ///
    /// Fails with [`GraphError::InvalidOperation`] on undirected graphs.
    fn condensation_graph(&self) -> Result<Graph<usize, Vec<Self::Key>>> {
        let components = sccs_by_discovery(self)?;

        let mut component_of = vec![0; self.node_bound()];
        for (i, nodes) in components.iter().enumerate() {
            for &u in nodes {
                component_of[u as usize] = i;
            }
        }

        let mut crossing: FxHashMap<(usize, usize), Weight> = FxHashMap::default();
        let mut order = Vec::new();
        for e in self.edge_records() {
            let (ci, cj) = (component_of[e.source as usize], component_of[e.target as usize]);
            if ci == cj {
                continue;
            }
            crossing
                .entry((ci, cj))
                .and_modify(|w| *w = w.min(e.weight))
                .or_insert_with(|| {
                    order.push((ci, cj));
                    e.weight
                });
        }

        let mut condensed = Graph::directed();
        for (i, nodes) in components.into_iter().enumerate() {
            condensed.add_node_with_data(i, self.keys_of(nodes));
        }
        for (ci, cj) in order {
            condensed.add_edge(ci, cj, crossing[&(ci, cj)])?;
        }

        Ok(condensed)
    }
}

impl<G: AdjacencyList + NodeKeys> Connectivity for G {}

/// Groups all nodes by union-find roots, ignoring edge directions
fn union_find_components<G: AdjacencyList>(graph: &G) -> Vec<Vec<Node>> {
    let mut sets = UnionFind::from_elements(graph.vertices());
    for e in graph.edge_records() {
        sets.union(e.source, e.target);
    }

    let mut index: FxHashMap<Node, usize> = FxHashMap::default();
    let mut components: Vec<Vec<Node>> = Vec::new();
    for u in graph.vertices() {
        let root = sets.find(&u).unwrap_or(u);
        let next = index.len();
        let i = *index.entry(root).or_insert(next);
        if i == components.len() {
            components.push(Vec::new());
        }
        components[i].push(u);
    }
    components
}

/// Tarjan's components sorted by the discovery index of their roots
fn sccs_by_discovery<G: AdjacencyList>(graph: &G) -> Result<Vec<Vec<Node>>> {
    ensure_operation!(
        graph.is_directed(),
        "strongly connected components require a directed graph"
    );

    let mut tarjan = StronglyConnectedComponents::new(graph);
    let mut components = tarjan.by_ref().collect_vec();
    components.sort_by_key(|nodes| tarjan.discovery_index(nodes[0]));
    Ok(components)
}

/// Implementation of Tarjan's Algorithm for Strongly Connected Components on node handles.
///
/// It is designed as an iterator that emits the nodes of one strongly connected component at a
/// time, in reverse topological order of the condensation graph. Within a component, nodes
/// appear in discovery order with the root first. Searches start at unvisited nodes in handle
/// order.
///
/// Edge directions are followed as stored, hence every connected component of an undirected
/// graph forms a single strongly connected component.
pub struct StronglyConnectedComponents<'a, G> {
    graph: &'a G,
    idx: Node,

    states: Vec<NodeState>,
    potentially_unvisited: usize,

    path_stack: Vec<Node>,

    call_stack: Vec<StackFrame<'a>>,
}

impl<'a, G> StronglyConnectedComponents<'a, G>
where
    G: AdjacencyList,
{
    /// Construct the iterator for some graph
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            idx: 0,
            states: vec![Default::default(); graph.node_bound()],
            potentially_unvisited: 0,

            path_stack: Vec::with_capacity(32),
            call_stack: Vec::with_capacity(32),
        }
    }

    /// Returns the DFS discovery index of `u`.
    /// Only meaningful once `u` has been visited.
    pub fn discovery_index(&self, u: Node) -> Node {
        self.states[u as usize].index
    }

    /// Starts a new search at the next unvisited alive node in handle order
    fn next_unvisited_node(&mut self) -> Option<Node> {
        while self.potentially_unvisited < self.graph.node_bound() {
            let v = self.potentially_unvisited as Node;
            if self.graph.has_vertex(v) && !self.states[v as usize].visited {
                self.push_node(v, None);
                return Some(v);
            }

            self.potentially_unvisited += 1;
        }
        None
    }

    /// Put a pristine stack frame on the call stack. Roughly speaking, this is the first step
    /// to a recursive call of search.
    fn push_node(&mut self, node: Node, parent: Option<Node>) {
        let graph = self.graph;
        self.call_stack.push(StackFrame {
            node,
            parent: parent.unwrap_or(node),
            initial_stack_len: 0,
            first_call: true,
            neighbors: Box::new(graph.neighbors_of(node)),
        });
    }

    fn search(&mut self) -> Option<Vec<Node>> {
        /*
        Tarjan's algorithm is usually stated recursively, which overflows the stack on deep
        graphs and cannot be paused to yield a component. Instead, all state including the
        neighbor iterators lives in `self.call_stack`, which simulates the recursion.

        On first visit, a node receives the next discovery index as index and low-link. The
        low-link is lowered to the smallest index reachable via tree edges plus one back-edge to a
        node still on the path stack. A node whose low-link equals its index is the root of a
        component consisting of all nodes above it on the path stack.
        */

        'recurse: while let Some(frame) = self.call_stack.last_mut() {
            let v = frame.node;

            if frame.first_call {
                frame.first_call = false;
                frame.initial_stack_len = self.path_stack.len() as Node;

                self.states[v as usize].visit(self.idx);
                self.idx += 1;

                self.path_stack.push(v);
            }

            while let Some(w) = frame.neighbors.next() {
                let w_state = self.states[w as usize];

                if !w_state.visited {
                    self.push_node(w, Some(v));
                    continue 'recurse;
                } else if w_state.on_stack {
                    self.states[v as usize].try_lower_link(w_state.index);
                }
            }

            let initial_stack_len = frame.initial_stack_len as usize;
            let parent = frame.parent;
            self.call_stack.pop();

            let state = self.states[v as usize];
            self.states[parent as usize].try_lower_link(state.low_link);

            if state.is_root() {
                let component = self.path_stack.split_off(initial_stack_len);
                for &w in &component {
                    self.states[w as usize].on_stack = false;
                }

                debug_assert_eq!(component.first(), Some(&v));
                return Some(component);
            }
        }

        None
    }
}

impl<G> Iterator for StronglyConnectedComponents<'_, G>
where
    G: AdjacencyList,
{
    type Item = Vec<Node>;

    /// Returns either a vector of node handles that form an SCC or None if no further SCC was found
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(x) = self.search() {
                return Some(x);
            }

            self.next_unvisited_node()?;
        }
    }
}

impl<G> FusedIterator for StronglyConnectedComponents<'_, G> where G: AdjacencyList {}

struct StackFrame<'a> {
    node: Node,
    parent: Node,
    initial_stack_len: Node,
    first_call: bool,
    neighbors: Box<dyn Iterator<Item = Node> + 'a>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeState {
    visited: bool,
    on_stack: bool,
    index: Node,
    low_link: Node,
}

impl NodeState {
    fn visit(&mut self, u: Node) {
        debug_assert!(!self.visited);
        self.index = u;
        self.low_link = u;
        self.visited = true;
        self.on_stack = true;
    }

    fn try_lower_link(&mut self, l: Node) {
        self.low_link = self.low_link.min(l);
    }

    fn is_root(&self) -> bool {
        self.index == self.low_link
    }
}
