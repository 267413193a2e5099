use crate::{edge::*, error::*, node::*};

/// Provides the directedness of a graph, which is fixed at construction
pub trait GraphType {
    /// Returns *true* if edges have an orientation
    fn is_directed(&self) -> bool;

    /// Returns *true* if `Edge(u, v)` and `Edge(v, u)` denote the same edge
    fn is_undirected(&self) -> bool {
        !self.is_directed()
    }
}

/// Provides getters pertaining to the node-size of a graph
pub trait GraphNodeOrder {
    /// Returns the number of (alive) nodes of the graph
    fn number_of_nodes(&self) -> NumNodes;

    /// Returns an exclusive upper bound on all node handles.
    ///
    /// # Warning
    /// As handles of removed nodes are never reused, this might be larger than the number of nodes.
    /// Vectors indexed by node should be of this size; it is the responsibility of the caller to
    /// skip entries of removed nodes.
    fn node_bound(&self) -> usize;

    /// Returns an iterator over all alive node handles in insertion order.
    fn vertices(&self) -> impl Iterator<Item = Node> + '_;

    /// Returns *true* if `u` is the handle of an alive node
    fn has_vertex(&self, u: Node) -> bool;

    /// Return the number of nodes as usize
    fn len(&self) -> usize {
        self.number_of_nodes() as usize
    }

    /// Returns *true* if the graph has no nodes (and thus no edges)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns empty bitset with one entry per node handle
    fn vertex_bitset_unset(&self) -> NodeBitSet {
        NodeBitSet::new(self.node_bound() as Node)
    }
}

/// Provides getters pertaining to the edge-size of a graph
pub trait GraphEdgeOrder {
    /// Returns the number of logical edges of the graph
    fn number_of_edges(&self) -> NumEdges;
}

/// Translation between external node keys and internal node handles
pub trait NodeKeys: GraphNodeOrder {
    type Key: NodeKey;

    /// Returns the key of a node handle.
    /// ** Panics if `u` is not alive **
    fn key_of(&self, u: Node) -> &Self::Key;

    /// Returns the handle of a key if it is part of the graph
    fn node_of(&self, key: &Self::Key) -> Option<Node>;

    /// Returns the handle of a key or fails with [`GraphError::NodeNotFound`]
    fn try_node_of(&self, key: &Self::Key) -> Result<Node> {
        self.node_of(key)
            .ok_or_else(|| GraphError::node_not_found(key))
    }

    /// Maps a sequence of handles to owned keys
    fn keys_of<I>(&self, nodes: I) -> Vec<Self::Key>
    where
        I: IntoIterator<Item = Node>,
    {
        nodes.into_iter().map(|u| self.key_of(u).clone()).collect()
    }
}

/// Traits pertaining getters for neighborhoods & edges.
///
/// For undirected graphs, incoming and outgoing neighborhoods coincide.
pub trait AdjacencyList: GraphNodeOrder + GraphType + Sized {
    /// Payload attached to every edge
    type EdgeData;

    /// Returns an iterator over the records of all edges leaving `u` in insertion order.
    /// For undirected graphs, these are all edges incident to `u` oriented away from `u`.
    /// ** Panics if `u` is not alive **
    fn out_edges_of(&self, u: Node) -> impl Iterator<Item = &EdgeRecord<Self::EdgeData>> + '_;

    /// Returns an iterator over the records of all edges entering `u`.
    /// For undirected graphs, these are all edges incident to `u` oriented towards `u`.
    /// ** Panics if `u` is not alive **
    fn in_edges_of(&self, u: Node) -> impl Iterator<Item = &EdgeRecord<Self::EdgeData>> + '_;

    /// Returns the record of the edge `(u, v)` if it exists.
    fn edge_of(&self, u: Node, v: Node) -> Option<&EdgeRecord<Self::EdgeData>>;

    /// Returns the number of outgoing neighbors of `u`
    /// ** Panics if `u` is not alive **
    fn out_degree_of(&self, u: Node) -> NumNodes;

    /// Returns the number of incoming neighbors of `u`
    /// ** Panics if `u` is not alive **
    fn in_degree_of(&self, u: Node) -> NumNodes;

    /// Returns the degree of `u`.
    /// For directed graphs this is `in_degree + out_degree` (self-loops are counted twice).
    /// ** Panics if `u` is not alive **
    fn degree_of(&self, u: Node) -> NumNodes {
        if self.is_directed() {
            self.in_degree_of(u) + self.out_degree_of(u)
        } else {
            self.out_degree_of(u)
        }
    }

    /// Returns an iterator over the (outgoing) neighborhood of `u`.
    /// ** Panics if `u` is not alive **
    fn neighbors_of(&self, u: Node) -> impl Iterator<Item = Node> + '_ {
        self.out_edges_of(u).map(|e| e.target)
    }

    /// Returns an iterator over nodes `v` with edges `(v, u)`
    /// ** Panics if `u` is not alive **
    fn in_neighbors_of(&self, u: Node) -> impl Iterator<Item = Node> + '_ {
        self.in_edges_of(u).map(|e| e.source)
    }

    /// Returns *true* if the edge `(u, v)` exists
    fn has_edge(&self, u: Node, v: Node) -> bool {
        self.edge_of(u, v).is_some()
    }

    /// Returns the weight of the edge `(u, v)` if it exists
    fn edge_weight_of(&self, u: Node, v: Node) -> Option<Weight> {
        self.edge_of(u, v).map(|e| e.weight)
    }

    /// Returns an iterator over all logical edges of the graph.
    /// Undirected edges are reported once with `source <= target` (in handle order).
    fn edge_records(&self) -> impl Iterator<Item = &EdgeRecord<Self::EdgeData>> + '_ {
        let directed = self.is_directed();
        self.vertices().flat_map(move |u| {
            self.out_edges_of(u)
                .filter(move |e| directed || e.source <= e.target)
        })
    }

    /// Returns *true* if any edge carries a negative weight
    fn has_negative_weights(&self) -> bool {
        self.edge_records().any(|e| e.weight < 0.0)
    }
}
