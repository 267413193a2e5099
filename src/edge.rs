use std::fmt::{Debug, Display};

use crate::node::*;

/// Edge weights are plain floating point numbers; unweighted graphs use `1.0` throughout
pub type Weight = f64;

/// Default weight of an edge if none is provided
pub const DEFAULT_WEIGHT: Weight = 1.0;

/// We limit the number of edges to `2^32 - 1`.
pub type NumEdges = u32;

/// A pair of node handles. Is is up to the user whether an Edge is directed or not.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(pub Node, pub Node);

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

impl Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

impl Edge {
    /// Returns true if both endpoints are equal
    pub fn is_loop(&self) -> bool {
        self.0 == self.1
    }
}

/// The record stored in an adjacency structure for every (directed) adjacency entry.
///
/// Undirected graphs store two records per logical edge, one at each endpoint, with
/// `source` being the node whose neighborhood holds the record.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord<E> {
    pub source: Node,
    pub target: Node,
    pub weight: Weight,
    pub data: E,
}

impl<E> EdgeRecord<E> {
    /// Returns *true* if both endpoints are equal
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A borrowed view of a logical edge in terms of node keys
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView<'a, K, E> {
    pub source: &'a K,
    pub target: &'a K,
    pub weight: Weight,
    pub data: &'a E,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loops_and_formatting() {
        assert!(Edge(2, 2).is_loop());
        assert!(!Edge(3, 1).is_loop());
        assert_eq!(format!("{:?}", Edge(0, 4)), "(0,4)");

        let record = EdgeRecord {
            source: 1,
            target: 1,
            weight: 2.0,
            data: (),
        };
        assert!(record.is_loop());
    }
}
