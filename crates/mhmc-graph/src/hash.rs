use sha2::{Digest, Sha256};

use crate::graph::Graph;

/// Computes the canonical structural hash for the provided graph.
pub fn canonical_hash(graph: &Graph) -> String {
    let mut hasher = Sha256::new();
    hasher.update((graph.n_nodes() as u64).to_le_bytes());
    hasher.update((graph.edges().len() as u64).to_le_bytes());
    for &(a, b) in graph.edges() {
        hasher.update((a as u64).to_le_bytes());
        hasher.update((b as u64).to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
