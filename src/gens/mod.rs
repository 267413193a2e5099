/*!
# Graph Generators

Helpers for building graphs programmatically:
- [`Substructures`] connects given keys into a path, a cycle or a clique,
- [`Gnp`] samples Erdős–Rényi `G(n,p)` graphs over the keys `0..n`.

Generators follow the builder pattern used throughout this crate:
```rust
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use wgraphs::gens::*;

let rng = &mut Pcg64Mcg::seed_from_u64(1);
let g = Gnp::new().nodes(100).avg_deg(5.0).generate(rng);
assert_eq!(g.node_count(), 100);
```
*/

use rand::Rng;

use crate::{prelude::*, utils::*};

mod gnp;
mod substructures;

pub use gnp::*;
pub use substructures::*;
