//! Events exchanged between logical processes and the kernel.

use crate::{NodeIndex, Timestamp};
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// Message travelling along the topology toward `destination`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadEvent {
    /// Final target of the message.
    pub destination: NodeIndex,

    /// Hops travelled so far, 1 on first emission.
    pub hop_count: u32,

    /// Percentage by which the receiver grows or shrinks its state.
    pub percent_state_size_change: f64,

    /// Percentage of the receiver's state bytes to overwrite.
    pub percent_state_change: f64,

    /// Delivery time.
    pub timestamp: Timestamp,
}

impl PayloadEvent {
    /// Copy of this payload one hop further along, delivered at `timestamp`.
    pub fn next_hop(&self, timestamp: Timestamp) -> Self {
        Self {
            hop_count: self.hop_count + 1,
            timestamp,
            ..self.clone()
        }
    }
}

/// Event kinds handled by a logical process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Self-scheduled timer.
    Timer {
        /// When the timer fires.
        timestamp: Timestamp,
    },

    /// Topology message.
    Payload(PayloadEvent),
}

impl Event {
    /// When this event is delivered.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Event::Timer { timestamp } => *timestamp,
            Event::Payload(payload) => payload.timestamp,
        }
    }

    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Timer { .. } => "Timer",
            Event::Payload(_) => "Payload",
        }
    }

    /// The payload, if this is a payload event.
    pub fn as_payload(&self) -> Option<&PayloadEvent> {
        match self {
            Event::Payload(payload) => Some(payload),
            Event::Timer { .. } => None,
        }
    }
}

/// An event plus routing information, as handed to and returned by a
/// logical process.
///
/// The kernel delivers each envelope to `receiver` no earlier than
/// `event.timestamp()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Emitting node.
    pub sender: NodeIndex,

    /// Node the kernel delivers to (the next hop for payloads).
    pub receiver: NodeIndex,

    /// The event itself.
    pub event: Event,
}

impl Envelope {
    /// A timer that `node` schedules for itself.
    pub fn timer(node: NodeIndex, timestamp: Timestamp) -> Self {
        Self {
            sender: node,
            receiver: node,
            event: Event::Timer { timestamp },
        }
    }

    /// A payload hop from `sender` to `receiver`.
    pub fn payload(sender: NodeIndex, receiver: NodeIndex, payload: PayloadEvent) -> Self {
        Self {
            sender,
            receiver,
            event: Event::Payload(payload),
        }
    }

    /// Delivery time.
    pub fn timestamp(&self) -> Timestamp {
        self.event.timestamp()
    }

    /// Whether the sender addressed this envelope to itself.
    pub fn is_self_addressed(&self) -> bool {
        self.sender == self.receiver
    }

    /// Approximate encoded size in bytes, for kernel accounting.
    pub fn size(&self) -> usize {
        let routing = 2 * size_of::<NodeIndex>() + size_of::<Timestamp>();
        match &self.event {
            Event::Timer { .. } => routing,
            Event::Payload(_) => {
                routing + size_of::<NodeIndex>() + size_of::<u32>() + 2 * size_of::<f64>()
            }
        }
    }
}
