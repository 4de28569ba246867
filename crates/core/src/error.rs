//! Configuration errors for the event model.

use thiserror::Error;
use topostress_topology::{ParseModelError, TopologyError};

/// Invalid configuration, detected before any event is generated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Topology parameters are out of range.
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    /// Topology selection could not be parsed.
    #[error(transparent)]
    Model(#[from] ParseModelError),

    #[error("mean inter-event time must be positive and finite, got {0}")]
    InvalidMeanTime(f64),

    #[error("{name} must be a percentage in [0, 100], got {value}")]
    InvalidPercentage { name: &'static str, value: f64 },

    #[error("time step must be at least one tick")]
    ZeroTimeStep,

    #[error("at least one initial timer per node is required")]
    ZeroInitialTimers,

    #[error("greedy routing needs a grid topology, got {0}")]
    GreedyRoutingWithoutGrid(String),

    #[error("unknown {kind} policy {value:?}")]
    UnknownPolicy { kind: &'static str, value: String },
}
