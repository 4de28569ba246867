//! Core types shared by every topostress crate.
//!
//! - [`NodeIndex`]: dense integer identity of a logical process, with the
//!   stable `Node_<index>` name derived from it.
//! - [`Timestamp`]: logical simulation time in integer ticks.
//! - [`Event`] / [`Envelope`]: the tagged union exchanged with the kernel.

mod event;
mod identifiers;

pub use event::{Envelope, Event, PayloadEvent};
pub use identifiers::{node_name, NodeIndex, Timestamp, NODE_NAME_PREFIX};
