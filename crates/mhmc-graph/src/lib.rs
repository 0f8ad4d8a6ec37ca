#![deny(missing_docs)]

//! Undirected site graphs used to build neighbour structures for transition rules.

mod distance;
mod generators;
mod graph;
mod hash;

pub use distance::{distances_from, pairs_within};
pub use generators::{chain, hypercube};
pub use graph::Graph;
pub use hash::canonical_hash;
