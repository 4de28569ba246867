//! Watts-Strogatz small-world generator.

use crate::graph::{self, node, Graph};
use rand::Rng;
use topostress_types::NodeIndex;
use tracing::debug;

/// Ordered neighbor lists of a small-world graph, see [`build`].
pub(crate) fn generate(
    node_count: usize,
    k: usize,
    beta: f64,
    rng: &mut impl Rng,
) -> Vec<Vec<NodeIndex>> {
    let graph = build(node_count, k, beta, rng);
    (0..node_count)
        .map(|i| ring_order(i, graph::neighbors(&graph, i), node_count))
        .collect()
}

/// Build a ring lattice of degree `k` over `node_count` nodes, then rewire
/// the far endpoint of each lattice edge with probability `beta`.
///
/// Edges are visited layer by layer (all `(i, i+1)` first, then all
/// `(i, i+2)`, ...). A rewired edge `(i, t)` becomes `(i, w)` with `w`
/// uniform over nodes that are neither `i` nor already adjacent to `i`; the
/// source keeps its edge, so no node ever loses its last neighbor.
///
/// Callers validate `k` (even, `0 < k < node_count`) and `beta`.
pub(crate) fn build(node_count: usize, k: usize, beta: f64, rng: &mut impl Rng) -> Graph {
    let half = k / 2;
    let mut graph = graph::with_nodes(node_count, node_count * half);

    for i in 0..node_count {
        for j in 1..=half {
            graph.add_edge(node(i), node((i + j) % node_count), ());
        }
    }

    if beta > 0.0 {
        let mut rewired = 0usize;
        for j in 1..=half {
            for i in 0..node_count {
                let target = (i + j) % node_count;
                // Edge indices shift on removal, so look the edge up each time.
                let Some(edge) = graph.find_edge(node(i), node(target)) else {
                    continue;
                };
                if !rng.gen_bool(beta) {
                    continue;
                }
                // Already adjacent to everyone else: nowhere to go.
                if graph.neighbors(node(i)).count() + 1 >= node_count {
                    debug!(node = i, "No rewiring candidate, keeping lattice edge");
                    continue;
                }
                // Rejection sampling is uniform over the valid candidates.
                let new_target = loop {
                    let candidate = rng.gen_range(0..node_count);
                    if candidate != i && !graph.contains_edge(node(i), node(candidate)) {
                        break candidate;
                    }
                };

                graph.remove_edge(edge);
                graph.add_edge(node(i), node(new_target), ());
                rewired += 1;
            }
        }
        debug!(rewired, edges = graph.edge_count(), "Rewired small-world edges");
    }

    graph
}

/// Order neighbors by signed ring offset from `origin`: nearest
/// counter-clockwise first, then clockwise (`-2, -1, +1, +2`).
fn ring_order(
    origin: usize,
    neighbors: impl Iterator<Item = usize>,
    node_count: usize,
) -> Vec<NodeIndex> {
    let signed_offset = |other: usize| {
        let offset = (other + node_count - origin) % node_count;
        if offset > node_count / 2 {
            offset as i64 - node_count as i64
        } else {
            offset as i64
        }
    };
    let mut ordered: Vec<usize> = neighbors.collect();
    ordered.sort_by_key(|&other| signed_offset(other));
    ordered.into_iter().map(|i| NodeIndex(i as u32)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    fn indices(raw: &[u32]) -> Vec<NodeIndex> {
        raw.iter().copied().map(NodeIndex).collect()
    }

    #[test]
    fn test_lattice_without_rewiring() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let adjacency = generate(10, 4, 0.0, &mut rng);

        assert_eq!(adjacency[0], indices(&[8, 9, 1, 2]));
        assert_eq!(adjacency[5], indices(&[3, 4, 6, 7]));
        for (i, neighbors) in adjacency.iter().enumerate() {
            let expected: BTreeSet<usize> = [10 - 2, 10 - 1, 1, 2]
                .iter()
                .map(|offset| (i + offset) % 10)
                .collect();
            let actual: BTreeSet<usize> = neighbors.iter().map(|n| n.as_usize()).collect();
            assert_eq!(actual, expected, "node {i}");
        }
    }

    #[test]
    fn test_full_rewiring_keeps_graph_simple_and_symmetric() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let adjacency = generate(50, 6, 1.0, &mut rng);

        let edges: usize = adjacency.iter().map(Vec::len).sum();
        assert_eq!(edges, 50 * 6, "rewiring preserves the edge count");

        for (i, neighbors) in adjacency.iter().enumerate() {
            assert!(!neighbors.is_empty());
            assert!(!neighbors.contains(&NodeIndex(i as u32)));
            let unique: BTreeSet<_> = neighbors.iter().collect();
            assert_eq!(unique.len(), neighbors.len());
            for n in neighbors {
                assert!(adjacency[n.as_usize()].contains(&NodeIndex(i as u32)));
            }
        }
    }

    #[test]
    fn test_same_seed_same_graph() {
        let a = generate(40, 4, 0.3, &mut ChaCha8Rng::seed_from_u64(1));
        let b = generate(40, 4, 0.3, &mut ChaCha8Rng::seed_from_u64(1));
        let c = generate(40, 4, 0.3, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_dense_ring_has_no_candidates() {
        // k = n - 1 rounded down to even leaves at most one free slot.
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let adjacency = generate(5, 4, 1.0, &mut rng);
        for neighbors in &adjacency {
            assert_eq!(neighbors.len(), 4);
        }
    }

    #[test]
    fn test_rewired_graph_stays_simple() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let rewired = build(60, 4, 0.5, &mut rng);
        assert_eq!(rewired.node_count(), 60);
        assert_eq!(rewired.edge_count(), 60 * 2);
        for i in 0..60 {
            assert!(!rewired.contains_edge(node(i), node(i)));
            let unique: BTreeSet<usize> = graph::neighbors(&rewired, i).collect();
            assert_eq!(unique.len(), graph::neighbors(&rewired, i).count());
        }
    }
}
