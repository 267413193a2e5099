/*!
# Graph Algorithms

This module provides the **graph algorithms** built on top of [`Graph`](crate::repr::Graph).
All algorithms are re-exported at the top level of this module, so you can simply do:
```rust
use wgraphs::algo::*;
```
and gain access to traversal, shortest paths, centrality, community detection, connectivity and
spanning trees.

Most algorithms are configuration structs following the *Builder* / *Setter* pattern and are
executed with `run`. The common cases are also available as trait methods on the graph itself
([`Traversal`], [`ShortestPaths`], [`Centrality`], [`CommunityDetection`], [`Connectivity`] and
[`SpanningTrees`]). Traversals are provided as **iterators** over node handles, making it easy to
consume results lazily; everything else reports results by node key.
*/

mod astar;
mod bellman_ford;
mod betweenness;
mod centrality;
mod connectivity;
mod floyd_warshall;
mod hits;
mod label_propagation;
mod louvain;
mod pagerank;
mod shortest_path;
mod spanning_tree;
mod spectral;
mod traversal;

use crate::{error::*, prelude::*, utils::*};

pub use astar::*;
pub use bellman_ford::*;
pub use betweenness::*;
pub use centrality::*;
pub use connectivity::*;
pub use floyd_warshall::*;
pub use hits::*;
pub use label_propagation::*;
pub use louvain::*;
pub use pagerank::*;
pub use shortest_path::*;
pub use spanning_tree::*;
pub use spectral::*;
pub use traversal::*;
