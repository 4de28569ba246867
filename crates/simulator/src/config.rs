//! Configuration types for the simulator.

use crate::SimulatorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use topostress_core::{ConfigError, ModelConfig, RoutingPolicy};
use topostress_topology::TopologyModel;

/// Configuration for a simulation run.
///
/// Loadable from TOML:
///
/// ```toml
/// num_nodes = 1000
/// end_time = 500
/// seed = 42
///
/// [topology]
/// model = "scale-free"
/// m = 3
/// a = 1.0
///
/// [model]
/// mean_time = 5.0
/// arrival = "reoriginate"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Number of logical processes. Ignored by grid topologies, whose size
    /// is `extent^dimensions`.
    pub num_nodes: usize,

    /// Topology model and its parameters.
    pub topology: TopologyModel,

    /// Traffic model shared by every node.
    pub model: ModelConfig,

    /// Last simulated tick processed.
    pub end_time: u64,

    /// Optional cap on processed events.
    pub max_events: Option<u64>,

    /// Random seed for deterministic simulation. Drawn at startup when
    /// unset.
    pub seed: Option<u64>,
}

impl SimulatorConfig {
    /// Create a configuration for `num_nodes` nodes on `topology`, routing
    /// the way the topology suggests.
    pub fn new(num_nodes: usize, topology: TopologyModel) -> Self {
        Self {
            num_nodes,
            model: ModelConfig::for_model(&topology),
            topology,
            end_time: 1000,
            max_events: None,
            seed: None,
        }
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SimulatorError> {
        let contents = fs::read_to_string(path).map_err(|source| SimulatorError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, SimulatorError> {
        Ok(toml::from_str(contents)?)
    }

    /// Set the traffic model.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    /// Set the end time.
    pub fn with_end_time(mut self, end_time: u64) -> Self {
        self.end_time = end_time;
        self
    }

    /// Set the event budget.
    pub fn with_max_events(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of nodes the topology will have.
    pub fn node_count(&self) -> Result<usize, ConfigError> {
        Ok(self
            .topology
            .implied_node_count()?
            .unwrap_or(self.num_nodes))
    }

    /// Check everything that can be checked before generating the topology.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topology.validate(self.node_count()?)?;
        self.model.validate()?;
        if self.model.routing == RoutingPolicy::Greedy && !self.topology.is_grid() {
            return Err(ConfigError::GreedyRoutingWithoutGrid(
                self.topology.kind_name().to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(100_000, TopologyModel::SmallWorld { k: 30, beta: 0.1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topostress_core::ArrivalPolicy;
    use topostress_topology::TopologyError;

    #[test]
    fn test_defaults() {
        let config = SimulatorConfig::default();
        assert_eq!(config.num_nodes, 100_000);
        assert_eq!(config.topology, TopologyModel::SmallWorld { k: 30, beta: 0.1 });
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.end_time, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_grid_sets_node_count_and_routing() {
        let config = SimulatorConfig::new(7, TopologyModel::grid(3, 4));
        assert_eq!(config.node_count(), Ok(64));
        assert_eq!(config.model.routing, RoutingPolicy::Greedy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = SimulatorConfig::from_toml(
            r#"
            num_nodes = 500
            seed = 7

            [topology]
            model = "scale-free"
            m = 3
            a = 1.5

            [model]
            mean_time = 4.0
            arrival = "reoriginate"
            "#,
        )
        .unwrap();

        assert_eq!(config.num_nodes, 500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.topology, TopologyModel::ScaleFree { m: 3, a: 1.5 });
        assert_eq!(config.model.mean_time, 4.0);
        assert_eq!(config.model.arrival, ArrivalPolicy::Reoriginate);
        assert_eq!(config.model.state_size, 100);
        assert_eq!(config.end_time, 1000);
    }

    #[test]
    fn test_from_toml_grid_order_defaults() {
        let config = SimulatorConfig::from_toml(
            r#"
            [topology]
            model = "grid"
            dimensions = 2
            extent = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.topology, TopologyModel::grid(2, 5));
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        assert!(matches!(
            SimulatorConfig::from_toml("nodes = 3"),
            Err(SimulatorError::ParseConfig(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        let odd = SimulatorConfig::new(10, TopologyModel::SmallWorld { k: 3, beta: 0.0 });
        assert_eq!(
            odd.validate(),
            Err(ConfigError::Topology(TopologyError::OddRingDegree(3)))
        );

        let greedy_ring = SimulatorConfig::default()
            .with_model(ModelConfig::default().with_routing(RoutingPolicy::Greedy));
        assert!(matches!(
            greedy_ring.validate(),
            Err(ConfigError::GreedyRoutingWithoutGrid(_))
        ));

        let huge_grid = SimulatorConfig::new(0, TopologyModel::grid(5, 1000));
        assert!(matches!(
            huge_grid.validate(),
            Err(ConfigError::Topology(TopologyError::GridTooLarge { .. }))
        ));
    }
}
