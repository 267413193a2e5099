/*!
`wgraphs` is a graph data structure & analytics library for graphs that are
- **labelled** : Nodes are identified by arbitrary hashable keys,
- **weighted** : Every edge carries an `f64` weight (`1.0` if you do not care),
- **directed** or **undirected** : Chosen once when the graph is created.

# Representation

Keys are mapped to dense **handles** `Node = u32` in insertion order. Algorithms operate on
handles only, which lets them use plain vectors and bitsets instead of hash maps, and translate
back to keys when reporting results. Handles of removed nodes are never reused.

[`Graph`](crate::repr::Graph) is the single storage backend. It stores outgoing adjacencies per
node and, for directed graphs, incoming adjacencies as well. Self-loops and parallel edges can be
enabled through [`GraphConfig`](crate::repr::GraphConfig).

# Design

All algorithms are provided as configurable structs that one can alter to their needs using
either the *Builder* / *Setter* pattern before calling `run` on a provided graph.
Alternatively, the most commonly used functionality is implemented via traits on the graph
itself, making it usable without configuring the algorithm beforehand.

Violated preconditions are reported as [`GraphError`](crate::error::GraphError). Absence of a
result (no path, no topological order) is reported as `None` instead.

# Usage

There are *4* core submodules you probably want to interact with:
- [`prelude`] includes the graph, node and edge definitions as well as the basic graph traits,
- [`algo`] includes traversals, shortest paths, centrality measures, community detection,
  connectivity and spanning trees,
- [`gens`] includes deterministic substructures (paths/cycles/cliques) and `G(n,p)` graphs,
- [`utils`] includes the priority queue and union-find shared by several algorithms.

In most use-cases, `use wgraphs::{prelude::*, algo::*};` suffices for your needs.

```rust
use wgraphs::{prelude::*, algo::*};

let mut g: Graph<&str> = Graph::directed();
g.add_edges([("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 5.0)]).unwrap();

let path = g.dijkstra_path(&"A", &"C").unwrap().unwrap();
assert_eq!(path.nodes, vec!["A", "B", "C"]);
assert_eq!(path.distance, 3.0);
```

Diagnostics are emitted through [`tracing`](https://docs.rs/tracing): algorithm summaries on
`DEBUG` and per-iteration progress on `TRACE`. Nothing is logged unless a subscriber is installed.
*/

pub mod algo;
pub mod edge;
pub mod error;
pub mod gens;
pub mod node;
pub mod ops;
pub mod repr;
#[cfg(test)]
pub(crate) mod testing;
pub mod utils;

/// `wgraphs::prelude` includes definitions for nodes and edges, the error type, all basic graph
/// operation traits as well as the graph itself.
pub mod prelude {
    pub use super::{
        edge::*,
        error::{GraphError, Result},
        node::*,
        ops::*,
        repr::*,
    };
}
