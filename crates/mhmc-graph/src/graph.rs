use std::collections::BTreeSet;

use mhmc_core::errors::{ErrorInfo, SamplerError};

/// Simple undirected graph over nodes `0..n_nodes`.
///
/// Edges are stored once with the smaller endpoint first and kept sorted, so
/// two graphs built from the same edge set compare equal regardless of
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    n_nodes: usize,
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Builds a graph from an edge list.
    ///
    /// Duplicate edges (in either orientation) are merged. Self loops and
    /// endpoints outside `0..n_nodes` are rejected.
    pub fn new(n_nodes: usize, edges: &[(usize, usize)]) -> Result<Self, SamplerError> {
        let mut unique = BTreeSet::new();
        for &(a, b) in edges {
            for node in [a, b] {
                if node >= n_nodes {
                    return Err(SamplerError::Graph(
                        ErrorInfo::new("node-out-of-range", "edge endpoint is not a graph node")
                            .with_context("node", node.to_string())
                            .with_context("n_nodes", n_nodes.to_string()),
                    ));
                }
            }
            if a == b {
                return Err(SamplerError::Graph(
                    ErrorInfo::new("self-loop", "edges must join distinct nodes")
                        .with_context("node", a.to_string()),
                ));
            }
            unique.insert((a.min(b), a.max(b)));
        }
        Ok(Self::from_sorted(n_nodes, unique.into_iter().collect()))
    }

    pub(crate) fn from_sorted(n_nodes: usize, edges: Vec<(usize, usize)>) -> Self {
        let mut adjacency = vec![Vec::new(); n_nodes];
        for &(a, b) in &edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
        }
        Self {
            n_nodes,
            edges,
            adjacency,
        }
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Sorted edge list, smaller endpoint first.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Sorted neighbours of `node`; empty for nodes outside the graph.
    pub fn neighbours(&self, node: usize) -> &[usize] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of neighbours of `node`.
    pub fn degree(&self, node: usize) -> usize {
        self.neighbours(node).len()
    }
}
