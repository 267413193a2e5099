/*!
# Node Representation

Callers address nodes by arbitrary *keys* (anything implementing [`NodeKey`]).
Internally, every node is assigned a dense *handle* `Node = u32` in insertion order.
Algorithms operate on handles only, which lets them use plain vectors and bitsets
indexed by node instead of hash maps.

Handles of removed nodes are never reused, hence handle order is insertion order.
*/

use std::{fmt::Debug, hash::Hash, num::NonZero};
use stream_bitset::bitset::BitSetImpl;

/// Internal node handle in the range `0..graph.node_bound()`
pub type Node = u32;

/// Node-Value that is considered invalid
pub const INVALID_NODE: Node = Node::MAX;

/// There can be at most `2^32 - 1` nodes in a graph!
pub type NumNodes = Node;

/// BitSet for Nodes
pub type NodeBitSet = BitSetImpl<Node>;

/// Bound for keys identifying nodes from the outside
pub trait NodeKey: Clone + Eq + Hash + Debug {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + Debug {}

/// As `Option<Node>` uses additional bytes for padding, it can be inefficient
/// since we often need to use `Vec<Option<Node>>` for predecessor arrays. This instead uses the
/// `NonZero`-Wrapper to assign a constant value (often)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct OptionalNodeImpl<const N: Node>(NonZero<Node>);

/// Often, `INVALID_NODE` is safe to pick as the `None`-Value
pub type OptionalNode = OptionalNodeImpl<INVALID_NODE>;

impl<const N: Node> OptionalNodeImpl<N> {
    /// Returns `Some(OptionalNodeImpl)` if `n != N` and `None` otherwise
    pub const fn new(n: Node) -> Option<Self> {
        match NonZero::new(n ^ N) {
            Some(inner) => Some(OptionalNodeImpl(inner)),
            None => None,
        }
    }

    /// Gets the underlying Node-Value
    pub const fn get(&self) -> Node {
        self.0.get() ^ N
    }
}
