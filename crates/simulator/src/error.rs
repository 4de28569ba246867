use std::path::PathBuf;
use thiserror::Error;
use topostress_core::ConfigError;
use topostress_topology::TopologyError;

/// Errors raised while setting up a simulation.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("topology generation failed: {0}")]
    Topology(#[from] TopologyError),

    #[error("failed to read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseConfig(#[from] toml::de::Error),
}
