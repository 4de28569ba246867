//! Sequential simulation runner.

use crate::event_queue::EventKey;
use std::collections::BTreeMap;
use std::sync::Arc;
use topostress_core::{build_nodes, ConfigError, LogicalProcess, ModelConfig, TrafficNode};
use topostress_topology::Topology;
use topostress_types::{Envelope, Event, Timestamp};
use tracing::{debug, info, trace};

/// Statistics collected during a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Total events processed.
    pub events_processed: u64,
    /// Timer events processed.
    pub timers_processed: u64,
    /// Payload hops delivered, arrivals included.
    pub payloads_delivered: u64,
    /// Payloads delivered to their final destination.
    pub payloads_arrived: u64,
    /// Events scheduled, including initial timers.
    pub events_scheduled: u64,
    /// Largest queue length observed.
    pub peak_queue_len: usize,
}

impl SimulationStats {
    /// Share of delivered payload hops that were final arrivals.
    pub fn arrival_ratio(&self) -> f64 {
        if self.payloads_delivered == 0 {
            0.0
        } else {
            self.payloads_arrived as f64 / self.payloads_delivered as f64
        }
    }
}

/// Why [`SimulationRunner::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The next event lies past the end time.
    EndTime,
    /// The event budget is spent.
    EventBudget,
    /// Nothing left to process.
    QueueEmpty,
}

/// Drives logical processes in global timestamp order.
///
/// A single-threaded reference kernel: pops the earliest event, hands it to
/// its receiver, and schedules whatever comes back. Given the same nodes and
/// seed, every run processes the same events in the same order.
pub struct SimulationRunner<P = TrafficNode> {
    nodes: Vec<P>,
    event_queue: BTreeMap<EventKey, Envelope>,
    sequence: u64,
    now: Timestamp,
    max_events: Option<u64>,
    initialized: bool,
    stats: SimulationStats,
}

impl SimulationRunner<TrafficNode> {
    /// One traffic node per topology entry, seeded from `seed`.
    pub fn traffic(
        topology: &Arc<Topology>,
        config: &ModelConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let nodes = build_nodes(topology, config, seed)?;
        info!(
            nodes = nodes.len(),
            model = %topology.model(),
            seed,
            "Created simulation runner"
        );
        Ok(Self::new(nodes))
    }
}

impl<P: LogicalProcess> SimulationRunner<P> {
    /// Create a runner over `nodes`. Node `i` must report index `i`.
    pub fn new(nodes: Vec<P>) -> Self {
        for (i, node) in nodes.iter().enumerate() {
            assert_eq!(node.index().as_usize(), i, "nodes must be in index order");
        }
        Self {
            nodes,
            event_queue: BTreeMap::new(),
            sequence: 0,
            now: Timestamp::ZERO,
            max_events: None,
            initialized: false,
            stats: SimulationStats::default(),
        }
    }

    /// Stop after processing this many events in total.
    pub fn with_event_budget(mut self, max_events: u64) -> Self {
        self.max_events = Some(max_events);
        self
    }

    /// Get simulation statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Get current simulation time.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Get the nodes.
    pub fn nodes(&self) -> &[P] {
        &self.nodes
    }

    /// Number of scheduled, unprocessed events.
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Collect every node's initial events. Runs once; later calls do
    /// nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        for i in 0..self.nodes.len() {
            let initial = self.nodes[i].initialize();
            for envelope in initial {
                self.schedule(envelope);
            }
        }
        debug!(pending = self.event_queue.len(), "Scheduled initial events");
    }

    fn schedule(&mut self, envelope: Envelope) {
        assert!(
            envelope.receiver.as_usize() < self.nodes.len(),
            "event scheduled for unknown receiver {}",
            envelope.receiver
        );
        let key = EventKey {
            time: envelope.timestamp(),
            node_index: envelope.receiver,
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.stats.events_scheduled += 1;
        self.event_queue.insert(key, envelope);
        self.stats.peak_queue_len = self.stats.peak_queue_len.max(self.event_queue.len());
    }

    /// Process events up to and including `end_time`.
    pub fn run_until(&mut self, end_time: Timestamp) -> StopReason {
        self.run_until_observed(end_time, |_| {})
    }

    /// Like [`run_until`](Self::run_until), calling `observer` with every
    /// envelope right before it is handled.
    pub fn run_until_observed<F>(&mut self, end_time: Timestamp, mut observer: F) -> StopReason
    where
        F: FnMut(&Envelope),
    {
        self.initialize();
        trace!(end_time = end_time.ticks(), "Running simulation");

        let reason = loop {
            if self
                .max_events
                .is_some_and(|max| self.stats.events_processed >= max)
            {
                break StopReason::EventBudget;
            }
            let Some((&key, _)) = self.event_queue.first_key_value() else {
                break StopReason::QueueEmpty;
            };
            if key.time > end_time {
                break StopReason::EndTime;
            }
            let Some((key, envelope)) = self.event_queue.pop_first() else {
                break StopReason::QueueEmpty;
            };
            self.now = key.time;

            self.stats.events_processed += 1;
            match &envelope.event {
                Event::Timer { .. } => self.stats.timers_processed += 1,
                Event::Payload(payload) => {
                    self.stats.payloads_delivered += 1;
                    if payload.destination == envelope.receiver {
                        self.stats.payloads_arrived += 1;
                    }
                }
            }
            observer(&envelope);

            let caused = self.nodes[key.node_index.as_usize()].on_event(&envelope);
            for next in caused {
                assert!(
                    next.timestamp() > self.now,
                    "{} emitted an event at {} while handling {}",
                    key.node_index,
                    next.timestamp(),
                    self.now
                );
                self.schedule(next);
            }
        };

        debug!(
            ?reason,
            now = self.now.ticks(),
            processed = self.stats.events_processed,
            remaining_events = self.event_queue.len(),
            "Simulation stopped"
        );
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topostress_core::ArrivalPolicy;
    use topostress_topology::{TopologyBuilder, TopologyModel};
    use tracing_test::traced_test;

    fn topology(model: TopologyModel, node_count: usize, seed: u64) -> Arc<Topology> {
        TopologyBuilder::new(model)
            .with_seed(seed)
            .build_indexed(node_count)
            .unwrap()
            .into_arc()
    }

    fn small_world() -> Arc<Topology> {
        topology(TopologyModel::SmallWorld { k: 4, beta: 0.2 }, 40, 8)
    }

    /// Every delivered envelope, in processing order.
    fn trace_run(seed: u64) -> Vec<Envelope> {
        let mut runner =
            SimulationRunner::traffic(&small_world(), &ModelConfig::default(), seed).unwrap();
        let mut seen = Vec::new();
        runner.run_until_observed(Timestamp(200), |e| seen.push(e.clone()));
        seen
    }

    #[test]
    fn test_events_processed_in_time_order() {
        let seen = trace_run(1);
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
        assert!(seen.iter().all(|e| e.timestamp() <= Timestamp(200)));
    }

    #[test]
    fn test_runs_are_reproducible() {
        let a = serde_json::to_vec(&trace_run(21)).unwrap();
        let b = serde_json::to_vec(&trace_run(21)).unwrap();
        let c = serde_json::to_vec(&trace_run(22)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_event_budget_stops_run() {
        let mut runner = SimulationRunner::traffic(&small_world(), &ModelConfig::default(), 4)
            .unwrap()
            .with_event_budget(25);
        assert_eq!(runner.run_until(Timestamp(u64::MAX)), StopReason::EventBudget);
        assert_eq!(runner.stats().events_processed, 25);
    }

    #[test]
    fn test_end_time_leaves_future_events_queued() {
        let mut runner =
            SimulationRunner::traffic(&small_world(), &ModelConfig::default(), 4).unwrap();
        assert_eq!(runner.run_until(Timestamp(50)), StopReason::EndTime);
        assert!(runner.now() <= Timestamp(50));
        // Every node keeps one timer armed.
        assert!(runner.pending_events() >= 40);

        let before = runner.stats().events_processed;
        runner.run_until(Timestamp(100));
        assert!(runner.stats().events_processed > before);
    }

    #[test]
    fn test_direct_payloads_arrive_in_one_hop() {
        let mut runner =
            SimulationRunner::traffic(&small_world(), &ModelConfig::default(), 2).unwrap();
        runner.run_until(Timestamp(300));
        let stats = runner.stats();
        assert!(stats.payloads_delivered > 0);
        assert_eq!(stats.payloads_delivered, stats.payloads_arrived);
        assert_eq!(stats.arrival_ratio(), 1.0);
    }

    #[test]
    fn test_greedy_routing_on_torus() {
        let model = TopologyModel::Grid {
            dimensions: 2,
            extent: 6,
            order: 2,
        };
        let topology = topology(model.clone(), 36, 0);
        let grid = *topology.grid().unwrap();
        let config = ModelConfig::for_model(&model);
        let mut runner = SimulationRunner::traffic(&topology, &config, 13).unwrap();

        let mut arrivals = 0;
        runner.run_until_observed(Timestamp(150), |envelope| {
            if let Some(payload) = envelope.event.as_payload() {
                assert_eq!(grid.distance(envelope.sender, envelope.receiver), 1);
                if payload.destination == envelope.receiver {
                    arrivals += 1;
                }
            }
        });
        assert!(arrivals > 0);
        assert!(runner.stats().payloads_delivered > runner.stats().payloads_arrived);
    }

    #[test]
    fn test_reoriginate_keeps_payloads_alive() {
        let config = ModelConfig::default().with_arrival(ArrivalPolicy::Reoriginate);
        let mut runner = SimulationRunner::traffic(&small_world(), &config, 6).unwrap();
        runner.run_until(Timestamp(100));
        let reoriginated: u64 = runner
            .nodes()
            .iter()
            .map(|n| n.stats().payloads_reoriginated)
            .sum();
        assert!(reoriginated > 0);
    }

    #[test]
    fn test_empty_queue() {
        let mut runner: SimulationRunner = SimulationRunner::new(Vec::new());
        assert_eq!(runner.run_until(Timestamp(10)), StopReason::QueueEmpty);
    }

    #[test]
    #[should_panic(expected = "index order")]
    fn test_nodes_must_be_in_order() {
        let topology = small_world();
        let mut nodes = build_nodes(&topology, &ModelConfig::default(), 0).unwrap();
        nodes.swap(0, 1);
        let _ = SimulationRunner::new(nodes);
    }

    #[test]
    #[traced_test]
    fn test_logs_creation() {
        let _runner =
            SimulationRunner::traffic(&small_world(), &ModelConfig::default(), 0).unwrap();
        assert!(logs_contain("Created simulation runner"));
    }
}
