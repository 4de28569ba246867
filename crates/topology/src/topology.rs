//! The generated topology and its builder.

use crate::{graph, scale_free, small_world, TopologyError, TopologyModel, TorusGrid};
use indexmap::IndexSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use topostress_types::{node_name, NodeIndex};
use tracing::info;

/// ChaCha stream reserved for topology generation. Node streams use the
/// node index, which always fits in 32 bits, so this never collides.
pub const TOPOLOGY_RNG_STREAM: u64 = u64::MAX;

/// Degree summary of a topology.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

/// Immutable mapping from node to ordered neighbor list.
///
/// Invariants, checked once at construction:
/// - every node has at least one neighbor;
/// - no node lists itself;
/// - no neighbor appears twice in a list.
#[derive(Debug, Clone)]
pub struct Topology {
    model: TopologyModel,
    names: IndexSet<String>,
    adjacency: Vec<Vec<NodeIndex>>,
    grid: Option<TorusGrid>,
}

impl Topology {
    /// Generate a topology over `names` (in ring/insertion order) using
    /// randomness from `rng`.
    pub fn generate<R: Rng>(
        names: Vec<String>,
        model: TopologyModel,
        rng: &mut R,
    ) -> Result<Self, TopologyError> {
        let node_count = names.len();
        model.validate(node_count)?;

        let mut unique = IndexSet::with_capacity(node_count);
        for name in names {
            if unique.contains(&name) {
                return Err(TopologyError::DuplicateName(name));
            }
            unique.insert(name);
        }

        let grid = model.torus()?;
        let adjacency = match (&model, grid) {
            (TopologyModel::SmallWorld { k, beta }, _) => {
                small_world::generate(node_count, *k as usize, *beta, rng)
            }
            (TopologyModel::ScaleFree { m, a }, _) => {
                scale_free::generate(node_count, *m as usize, *a, rng)
            }
            (TopologyModel::Grid { .. }, Some(grid)) => (0..node_count as u32)
                .map(|i| grid.neighbors(NodeIndex(i)))
                .collect(),
            (TopologyModel::Grid { .. }, None) => unreachable!("grid model without torus"),
        };

        let topology = Self {
            model,
            names: unique,
            adjacency,
            grid,
        };
        topology.assert_invariants();

        let degrees = topology.degree_stats();
        info!(
            model = %topology.model,
            nodes = topology.len(),
            edges = topology.edge_count(),
            min_degree = degrees.min,
            max_degree = degrees.max,
            mean_degree = degrees.mean,
            "Generated topology"
        );

        Ok(topology)
    }

    fn assert_invariants(&self) {
        for (i, neighbors) in self.adjacency.iter().enumerate() {
            assert!(!neighbors.is_empty(), "{} has no neighbors", self.names[i]);
            let mut seen = IndexSet::with_capacity(neighbors.len());
            for &neighbor in neighbors {
                assert_ne!(neighbor.as_usize(), i, "{} lists itself", self.names[i]);
                assert!(
                    neighbor.as_usize() < self.adjacency.len(),
                    "{} lists unknown {neighbor}",
                    self.names[i]
                );
                assert!(
                    seen.insert(neighbor),
                    "{} lists {neighbor} twice",
                    self.names[i]
                );
            }
        }
    }

    /// Model this topology was generated from.
    pub fn model(&self) -> &TopologyModel {
        &self.model
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the topology has no nodes. Never true for a built topology.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Whether `index` names a node of this topology.
    pub fn contains(&self, index: NodeIndex) -> bool {
        index.as_usize() < self.adjacency.len()
    }

    /// Name of the node at `index`.
    pub fn name(&self, index: NodeIndex) -> Option<&str> {
        self.names.get_index(index.as_usize()).map(String::as_str)
    }

    /// Index of the node called `name`.
    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.names.get_index_of(name).map(|i| NodeIndex(i as u32))
    }

    /// All node names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Ordered neighbor list of `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not part of the topology.
    pub fn neighbors(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.adjacency[index.as_usize()]
    }

    /// Neighbor names of the node called `name`.
    pub fn adjacency_list(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.index_of(name)?;
        Some(
            self.neighbors(index)
                .iter()
                .filter_map(|&n| self.name(n))
                .collect(),
        )
    }

    /// Torus resolver, for grid topologies.
    pub fn grid(&self) -> Option<&TorusGrid> {
        self.grid.as_ref()
    }

    /// Number of distinct neighbor relations (undirected edges count once).
    pub fn edge_count(&self) -> usize {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, neighbors)| neighbors.iter().map(move |&n| (i, n.as_usize())))
            .filter(|&(i, n)| i < n || !self.adjacency[n].contains(&NodeIndex(i as u32)))
            .count()
    }

    /// Whether every neighbor relation holds in both directions.
    pub fn is_symmetric(&self) -> bool {
        self.adjacency.iter().enumerate().all(|(i, neighbors)| {
            neighbors
                .iter()
                .all(|n| self.adjacency[n.as_usize()].contains(&NodeIndex(i as u32)))
        })
    }

    /// Whether every node is reachable from every other.
    pub fn is_connected(&self) -> bool {
        graph::is_connected(&graph::from_adjacency(&self.adjacency))
    }

    /// Minimum, maximum and mean neighbor count.
    pub fn degree_stats(&self) -> DegreeStats {
        let degrees = self.adjacency.iter().map(Vec::len);
        DegreeStats {
            min: degrees.clone().min().unwrap_or(0),
            max: degrees.clone().max().unwrap_or(0),
            mean: degrees.sum::<usize>() as f64 / self.adjacency.len().max(1) as f64,
        }
    }

    /// Wrap in an `Arc` for read-only sharing across node handlers.
    pub fn into_arc(self) -> Arc<Topology> {
        Arc::new(self)
    }
}

/// Builds a [`Topology`] from a model and an optional run seed.
///
/// With a seed, generation is reproducible: the generator draws from
/// ChaCha8 stream [`TOPOLOGY_RNG_STREAM`] of the seed. Without one it draws
/// from OS entropy.
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    model: TopologyModel,
    seed: Option<u64>,
}

impl TopologyBuilder {
    /// Create a builder for `model`.
    pub fn new(model: TopologyModel) -> Self {
        Self { model, seed: None }
    }

    /// Set the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build over caller-supplied node names.
    pub fn build<I, S>(&self, names: I) -> Result<Topology, TopologyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut rng = match self.seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(TOPOLOGY_RNG_STREAM);
                rng
            }
            None => ChaCha8Rng::from_entropy(),
        };
        Topology::generate(names, self.model.clone(), &mut rng)
    }

    /// Build over `Node_0 .. Node_{node_count-1}`.
    pub fn build_indexed(&self, node_count: usize) -> Result<Topology, TopologyError> {
        let node_count = u32::try_from(node_count)
            .map_err(|_| TopologyError::TooManyNodes(node_count))?;
        self.build((0..node_count).map(node_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn small_world(node_count: usize, k: u32, beta: f64, seed: u64) -> Topology {
        TopologyBuilder::new(TopologyModel::SmallWorld { k, beta })
            .with_seed(seed)
            .build_indexed(node_count)
            .unwrap()
    }

    #[traced_test]
    #[test]
    fn test_ring_scenario_by_name() {
        let topology = small_world(10, 4, 0.0, 1);

        assert_eq!(
            topology.adjacency_list("Node_0").unwrap(),
            vec!["Node_8", "Node_9", "Node_1", "Node_2"]
        );
        assert_eq!(topology.edge_count(), 20);
        assert!(topology.is_symmetric());
        assert!(topology.is_connected());
        assert!(logs_contain("Generated topology"));
    }

    #[test]
    fn test_unrewired_lattice_for_every_node() {
        let topology = small_world(12, 6, 0.0, 3);
        for i in 0..12u32 {
            let mut expected: Vec<u32> = [9, 10, 11, 1, 2, 3]
                .iter()
                .map(|offset| (i + offset) % 12)
                .collect();
            expected.sort_unstable();
            let mut actual: Vec<u32> = topology.neighbors(NodeIndex(i)).iter().map(|n| n.0).collect();
            actual.sort_unstable();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_seeded_builds_are_reproducible() {
        let a = small_world(100, 6, 0.2, 42);
        let b = small_world(100, 6, 0.2, 42);
        for i in 0..100u32 {
            assert_eq!(a.neighbors(NodeIndex(i)), b.neighbors(NodeIndex(i)));
        }
        assert!(a.is_symmetric());
    }

    #[test]
    fn test_scale_free_connected_and_symmetric() {
        let topology = TopologyBuilder::new(TopologyModel::ScaleFree { m: 2, a: 1.0 })
            .with_seed(9)
            .build_indexed(500)
            .unwrap();
        assert!(topology.is_connected());
        assert!(topology.is_symmetric());
        assert_eq!(topology.edge_count(), 3 + (500 - 3) * 2);
        assert!(topology.degree_stats().min >= 2);
    }

    #[test]
    fn test_grid_topology_exposes_resolver() {
        let topology = TopologyBuilder::new(TopologyModel::grid(2, 3))
            .build_indexed(9)
            .unwrap();

        let grid = topology.grid().unwrap();
        assert_eq!(grid.coordinates_of(NodeIndex(4)), vec![1, 1]);
        assert_eq!(
            topology.adjacency_list("Node_4").unwrap(),
            vec!["Node_5", "Node_3", "Node_7", "Node_1"]
        );
        assert_eq!(topology.degree_stats().max, 4);
        assert!(topology.is_symmetric());
    }

    #[test]
    fn test_custom_names_keep_input_order() {
        let names = ["a", "b", "c", "d", "e"];
        let topology = TopologyBuilder::new(TopologyModel::SmallWorld { k: 2, beta: 0.0 })
            .build(names)
            .unwrap();
        assert_eq!(topology.index_of("c"), Some(NodeIndex(2)));
        assert_eq!(topology.name(NodeIndex(4)), Some("e"));
        assert_eq!(topology.adjacency_list("a").unwrap(), vec!["e", "b"]);
        assert_eq!(topology.adjacency_list("zzz"), None);
        assert_eq!(topology.names().count(), 5);
    }

    #[test]
    fn test_configuration_errors_fail_before_generation() {
        let err = TopologyBuilder::new(TopologyModel::SmallWorld { k: 10, beta: 0.1 })
            .build_indexed(10)
            .unwrap_err();
        assert_eq!(err, TopologyError::RingDegreeTooLarge { k: 10, nodes: 10 });

        let err = TopologyBuilder::new(TopologyModel::ScaleFree { m: 4, a: 1.0 })
            .build_indexed(4)
            .unwrap_err();
        assert_eq!(err, TopologyError::AttachmentTooLarge { m: 4, nodes: 4 });

        let err = TopologyBuilder::new(TopologyModel::SmallWorld { k: 2, beta: 0.0 })
            .build(["x", "y", "x"])
            .unwrap_err();
        assert_eq!(err, TopologyError::DuplicateName("x".into()));
    }
}
