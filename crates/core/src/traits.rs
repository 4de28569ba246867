//! The kernel-facing logical process trait.

use topostress_types::{Envelope, NodeIndex, Timestamp};

/// A logical process driven by an external simulation kernel.
///
/// Every implementation is:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + envelope = same output
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// The kernel guarantees at most one call in flight per process. Different
/// processes may be driven concurrently from different threads.
///
/// # Example
///
/// ```ignore
/// let mut pending: Vec<Envelope> = nodes.iter_mut().flat_map(|n| n.initialize()).collect();
/// while let Some(envelope) = next_in_timestamp_order(&mut pending) {
///     let node = &mut nodes[envelope.receiver.as_usize()];
///     pending.extend(node.on_event(&envelope));
/// }
/// ```
pub trait LogicalProcess {
    /// This process's identity.
    fn index(&self) -> NodeIndex;

    /// Stable name of this process.
    fn name(&self) -> String {
        self.index().name()
    }

    /// Produce the initial events. Called once, at simulation start.
    fn initialize(&mut self) -> Vec<Envelope>;

    /// Handle one delivered envelope, returning the events it causes.
    ///
    /// # Guarantees
    ///
    /// Every returned envelope is timestamped strictly after `envelope`.
    ///
    /// # Panics
    ///
    /// Panics if `envelope` is addressed to another process or names a
    /// destination outside the topology. Both mean the topology or the
    /// kernel is broken.
    fn on_event(&mut self, envelope: &Envelope) -> Vec<Envelope>;

    /// Timestamp of the last handled event.
    fn now(&self) -> Timestamp;
}
