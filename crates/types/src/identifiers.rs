//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every logical process name.
pub const NODE_NAME_PREFIX: &str = "Node_";

/// Build the stable name of the node at `index`.
pub fn node_name(index: u32) -> String {
    format!("{NODE_NAME_PREFIX}{index}")
}

/// Logical process identifier.
///
/// Dense: a topology over N nodes uses indices `0..N`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Get the raw index.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Index usable for slice access.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// The node's stable name.
    pub fn name(self) -> String {
        node_name(self.0)
    }
}

impl From<u32> for NodeIndex {
    fn from(index: u32) -> Self {
        NodeIndex(index)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{NODE_NAME_PREFIX}{}", self.0)
    }
}

/// Logical simulation time in integer ticks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Simulation start.
    pub const ZERO: Self = Timestamp(0);

    /// Get the raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// The timestamp `ticks` after this one.
    ///
    /// # Panics
    ///
    /// Panics if the result does not fit in 64 bits. No configured horizon
    /// gets near that, so overflow means a broken delay computation.
    pub fn after(self, ticks: u64) -> Self {
        Timestamp(
            self.0
                .checked_add(ticks)
                .expect("timestamp overflow: simulation horizon exceeds u64 ticks"),
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}
