//! Topostress Simulator
//!
//! A reference driver for the topostress event model. It generates a
//! topology, creates one traffic node per vertex and runs them on the
//! sequential kernel from `topostress-simulation`.
//!
//! # Architecture
//!
//! - **Configuration**: [`SimulatorConfig`], built in code or loaded from TOML
//! - **Setup**: topology generation and node creation from one run seed
//! - **Metrics**: hop counts at arrival and per-node delivery load
//!
//! # Example
//!
//! ```ignore
//! use topostress_simulator::{Simulator, SimulatorConfig};
//! use topostress_topology::TopologyModel;
//!
//! let config = SimulatorConfig::new(10_000, TopologyModel::ScaleFree { m: 3, a: 1.0 })
//!     .with_end_time(500)
//!     .with_seed(12345);
//!
//! let mut simulator = Simulator::new(config)?;
//! let report = simulator.run();
//! report.print_summary();
//! ```

pub mod config;
mod error;
pub mod metrics;
pub mod runner;

pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use metrics::{MetricsCollector, SimulationReport};
pub use runner::Simulator;
