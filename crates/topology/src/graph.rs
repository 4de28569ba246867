//! Undirected graph storage shared by the random generators.
//!
//! Graph node `i` always stands for topology node `i`: nodes are added up
//! front and never removed, so petgraph indices stay dense.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex as GraphIndex, UnGraph};
use topostress_types::NodeIndex;

pub(crate) type Graph = UnGraph<(), ()>;

/// `node_count` isolated nodes with room for `edge_count` edges.
pub(crate) fn with_nodes(node_count: usize, edge_count: usize) -> Graph {
    let mut graph = Graph::with_capacity(node_count, edge_count);
    for _ in 0..node_count {
        graph.add_node(());
    }
    graph
}

pub(crate) fn node(index: usize) -> GraphIndex {
    GraphIndex::new(index)
}

/// Neighbor indices of `index`, unordered.
pub(crate) fn neighbors(graph: &Graph, index: usize) -> impl Iterator<Item = usize> + '_ {
    graph.neighbors(node(index)).map(|n| n.index())
}

/// Rebuild a graph from per-node neighbor lists. An edge listed from both
/// ends is added once.
pub(crate) fn from_adjacency(adjacency: &[Vec<NodeIndex>]) -> Graph {
    let mut graph = with_nodes(adjacency.len(), adjacency.iter().map(Vec::len).sum::<usize>() / 2);
    for (i, neighbors) in adjacency.iter().enumerate() {
        for neighbor in neighbors {
            let j = neighbor.as_usize();
            if i < j || !adjacency[j].contains(&NodeIndex(i as u32)) {
                graph.add_edge(node(i), node(j), ());
            }
        }
    }
    graph
}

/// Whether the graph is a single component. An empty graph counts as
/// connected.
pub(crate) fn is_connected(graph: &Graph) -> bool {
    graph.node_count() == 0 || connected_components(graph) == 1
}
