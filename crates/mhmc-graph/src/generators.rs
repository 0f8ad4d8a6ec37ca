use std::collections::BTreeSet;

use mhmc_core::errors::{ErrorInfo, SamplerError};

use crate::graph::Graph;

/// One-dimensional chain of `length` sites, periodic when `pbc` is set.
pub fn chain(length: usize, pbc: bool) -> Result<Graph, SamplerError> {
    hypercube(length, 1, pbc)
}

/// Hypercubic lattice with `length` sites per side in `n_dim` dimensions.
///
/// Sites are numbered in row-major order with the last axis fastest. With
/// periodic boundaries the wrap-around bond is only added for `length > 2`,
/// since for two sites it would duplicate the open bond.
pub fn hypercube(length: usize, n_dim: usize, pbc: bool) -> Result<Graph, SamplerError> {
    if length == 0 || n_dim == 0 {
        return Err(SamplerError::Graph(
            ErrorInfo::new("empty-lattice", "lattice needs a positive side length and dimension")
                .with_context("length", length.to_string())
                .with_context("n_dim", n_dim.to_string()),
        ));
    }
    let n_nodes = length
        .checked_pow(n_dim as u32)
        .ok_or_else(|| {
            SamplerError::Graph(
                ErrorInfo::new("lattice-too-large", "lattice size overflows usize")
                    .with_context("length", length.to_string())
                    .with_context("n_dim", n_dim.to_string()),
            )
        })?;

    let mut edges = BTreeSet::new();
    for node in 0..n_nodes {
        let mut stride = 1;
        for _ in 0..n_dim {
            let coordinate = (node / stride) % length;
            if coordinate + 1 < length {
                edges.insert((node, node + stride));
            } else if pbc && length > 2 {
                let wrapped = node - coordinate * stride;
                edges.insert((wrapped.min(node), wrapped.max(node)));
            }
            stride *= length;
        }
    }
    Ok(Graph::from_sorted(n_nodes, edges.into_iter().collect()))
}
