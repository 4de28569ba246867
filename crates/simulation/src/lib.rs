//! Deterministic simulation runner.
//!
//! A minimal sequential kernel for topostress logical processes. Given the
//! same topology, configuration and seed, it produces identical results
//! every run. Real PDES kernels replace this crate; it exists to exercise
//! the event model end to end.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Event Queue (BTreeMap<EventKey, Envelope>)     │ │
//! │  │     Ordered by: time, receiver, sequence           │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     nodes: Vec<impl LogicalProcess>                │ │
//! │  │     Each handles one envelope at a time            │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Emitted envelopes → schedule new events        │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod event_queue;
mod runner;

pub use event_queue::EventKey;
pub use runner::{SimulationRunner, SimulationStats, StopReason};
