//! Logical process event model for topostress.
//!
//! Each [`TrafficNode`] is a [`LogicalProcess`]: a deterministic handler that
//! turns one delivered [`Envelope`](topostress_types::Envelope) into the
//! envelopes it causes. The kernel owns the clock, the queue and delivery.
//!
//! - A timer re-arms itself after an exponentially distributed delay and
//!   sends a payload to a uniformly chosen neighbor.
//! - A payload not yet at its destination is forwarded one hop per
//!   [`ModelConfig::fixed_time_step`].
//! - A payload at its destination rewrites the node's [`LpState`].
//!
//! All randomness comes from a per-node ChaCha8 stream ([`node_rng`]), so
//! identical seeds reproduce identical event sequences under any
//! scheduling order.

mod config;
mod error;
mod node;
mod rng;
mod state;
mod traits;

pub use config::{ArrivalPolicy, ModelConfig, PayloadTiming, RoutingPolicy};
pub use error::ConfigError;
pub use node::{build_nodes, NodeStats, TrafficNode};
pub use rng::{node_rng, quantize_delay, ExponentialDelay};
pub use state::LpState;
pub use traits::LogicalProcess;
