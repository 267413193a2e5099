/*!
# Graph Representation

[`Graph`] is the single storage backend of this crate. Nodes are stored in an arena of slots
indexed by their [`Node`] handle, and every node owns a [`Neighborhood`] of outgoing
[`EdgeRecord`]s. Directed graphs additionally keep a reverse [`Neighborhood`] of source handles
so that in-degree and in-neighbor queries do not require a scan over all nodes.

The keyed API (`add_edge`, `neighbors`, `degree`, ...) lives on [`Graph`] itself, while
algorithms use the handle-based traits of [`crate::ops`].
*/

use crate::{edge::*, error::*, node::*, ops::*};

mod graph;
mod neighborhood;

pub use graph::*;
pub use neighborhood::*;
