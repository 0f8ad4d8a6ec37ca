use std::collections::VecDeque;

use crate::graph::Graph;

/// Breadth-first hop distances from `source` to every node.
///
/// Unreachable nodes (and every node when `source` is out of range) map to
/// `None`.
pub fn distances_from(graph: &Graph, source: usize) -> Vec<Option<usize>> {
    let mut distances = vec![None; graph.n_nodes()];
    if source >= graph.n_nodes() {
        return distances;
    }
    distances[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        let next = distances[node].map(|d| d + 1);
        for &neighbour in graph.neighbours(node) {
            if distances[neighbour].is_none() {
                distances[neighbour] = next;
                queue.push_back(neighbour);
            }
        }
    }
    distances
}

/// All pairs `(i, j)` with `i < j` whose distance lies in `1..=d_max`, sorted.
pub fn pairs_within(graph: &Graph, d_max: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..graph.n_nodes() {
        let distances = distances_from(graph, i);
        for (j, distance) in distances.iter().enumerate().skip(i + 1) {
            if matches!(distance, Some(d) if *d >= 1 && *d <= d_max) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
