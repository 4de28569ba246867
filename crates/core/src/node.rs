//! The traffic-generating logical process.

use crate::config::{ArrivalPolicy, ModelConfig, PayloadTiming, RoutingPolicy};
use crate::error::ConfigError;
use crate::rng::{node_rng, quantize_delay, ExponentialDelay};
use crate::state::LpState;
use crate::traits::LogicalProcess;
use rand::distributions::Distribution;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use topostress_topology::Topology;
use topostress_types::{Envelope, Event, NodeIndex, PayloadEvent, Timestamp};
use tracing::trace;

/// Counters kept by each node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub timers_fired: u64,
    pub payloads_originated: u64,
    pub payloads_forwarded: u64,
    pub payloads_arrived: u64,
    pub payloads_reoriginated: u64,
}

/// A logical process that emits payloads to random neighbors on a
/// self-rescheduling timer and relays payloads addressed elsewhere.
///
/// Generic over the delay distribution so tests can pin delays.
#[derive(Debug)]
pub struct TrafficNode<D = ExponentialDelay> {
    index: NodeIndex,
    topology: Arc<Topology>,
    config: ModelConfig,
    delay: D,
    rng: ChaCha8Rng,
    state: LpState,
    now: Timestamp,
    stats: NodeStats,
}

impl TrafficNode<ExponentialDelay> {
    /// Node `index` of a run seeded with `seed`.
    pub fn new(
        index: NodeIndex,
        topology: Arc<Topology>,
        config: ModelConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate_for(&topology)?;
        let delay = ExponentialDelay::new(config.mean_time);
        Ok(Self::with_delay(index, topology, config, node_rng(seed, index), delay))
    }
}

impl<D: Distribution<f64>> TrafficNode<D> {
    /// Build a node around an explicit generator and delay distribution.
    /// The configuration is assumed validated.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `topology`.
    pub fn with_delay(
        index: NodeIndex,
        topology: Arc<Topology>,
        config: ModelConfig,
        rng: ChaCha8Rng,
        delay: D,
    ) -> Self {
        assert!(
            topology.contains(index),
            "{index} is not part of a {}-node topology",
            topology.len()
        );
        let state = LpState::new(config.state_size);
        Self {
            index,
            topology,
            config,
            delay,
            rng,
            state,
            now: Timestamp::ZERO,
            stats: NodeStats::default(),
        }
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub fn state(&self) -> &LpState {
        &self.state
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn draw_delay(&mut self) -> u64 {
        quantize_delay(self.delay.sample(&mut self.rng))
    }

    /// Receiver of the next hop toward `destination`.
    fn next_hop(&self, destination: NodeIndex) -> NodeIndex {
        match self.config.routing {
            RoutingPolicy::Direct => destination,
            RoutingPolicy::Greedy => {
                let grid = self
                    .topology
                    .grid()
                    .expect("greedy routing is validated against a grid topology");
                grid.route_hop(self.index, destination)
                    .expect("next hop requested for a payload that already arrived")
            }
        }
    }

    fn on_timer(&mut self) -> Vec<Envelope> {
        self.stats.timers_fired += 1;

        let fire_at = self.now.after(self.draw_delay());
        let payload_at = match self.config.payload_timing {
            PayloadTiming::SharedDelay => fire_at,
            PayloadTiming::IndependentDelay => self.now.after(self.draw_delay()),
        };

        let destination = *self
            .topology
            .neighbors(self.index)
            .choose(&mut self.rng)
            .expect("topology nodes always have neighbors");
        let payload = PayloadEvent {
            destination,
            hop_count: 1,
            percent_state_size_change: self.config.percent_state_size_change,
            percent_state_change: self.config.percent_state_change,
            timestamp: payload_at,
        };
        let receiver = self.next_hop(destination);
        self.stats.payloads_originated += 1;

        vec![
            Envelope::timer(self.index, fire_at),
            Envelope::payload(self.index, receiver, payload),
        ]
    }

    fn on_payload(&mut self, payload: &PayloadEvent) -> Vec<Envelope> {
        assert!(
            self.topology.contains(payload.destination),
            "payload destination {} is not part of the topology",
            payload.destination
        );
        let step_at = self.now.after(self.config.fixed_time_step);

        if payload.destination != self.index {
            self.stats.payloads_forwarded += 1;
            let receiver = self.next_hop(payload.destination);
            return vec![Envelope::payload(
                self.index,
                receiver,
                payload.next_hop(step_at),
            )];
        }

        self.stats.payloads_arrived += 1;
        self.state.apply_change(
            payload.percent_state_size_change,
            payload.percent_state_change,
            &mut self.rng,
        );

        match self.config.arrival {
            ArrivalPolicy::Consume => Vec::new(),
            ArrivalPolicy::Reoriginate => {
                self.stats.payloads_reoriginated += 1;
                let again = PayloadEvent {
                    hop_count: 1,
                    timestamp: step_at,
                    ..payload.clone()
                };
                vec![Envelope::payload(self.index, self.index, again)]
            }
        }
    }
}

impl<D: Distribution<f64>> LogicalProcess for TrafficNode<D> {
    fn index(&self) -> NodeIndex {
        self.index
    }

    fn name(&self) -> String {
        self.topology
            .name(self.index)
            .map(str::to_string)
            .unwrap_or_else(|| self.index.name())
    }

    fn initialize(&mut self) -> Vec<Envelope> {
        (0..self.config.initial_timers)
            .map(|_| {
                let at = Timestamp::ZERO.after(self.draw_delay());
                Envelope::timer(self.index, at)
            })
            .collect()
    }

    fn on_event(&mut self, envelope: &Envelope) -> Vec<Envelope> {
        assert_eq!(
            envelope.receiver, self.index,
            "envelope for {} delivered to {}",
            envelope.receiver, self.index
        );
        self.now = envelope.timestamp();
        trace!(
            node = %self.index,
            from = %envelope.sender,
            event = envelope.event.type_name(),
            time = self.now.ticks(),
            "Handling event"
        );

        match &envelope.event {
            Event::Timer { .. } => self.on_timer(),
            Event::Payload(payload) => self.on_payload(payload),
        }
    }

    fn now(&self) -> Timestamp {
        self.now
    }
}

/// One node per topology entry, each on its own stream of `seed`.
pub fn build_nodes(
    topology: &Arc<Topology>,
    config: &ModelConfig,
    seed: u64,
) -> Result<Vec<TrafficNode>, ConfigError> {
    config.validate_for(topology)?;
    let delay = ExponentialDelay::new(config.mean_time);
    Ok((0..topology.len() as u32)
        .map(NodeIndex)
        .map(|index| {
            TrafficNode::with_delay(
                index,
                Arc::clone(topology),
                config.clone(),
                node_rng(seed, index),
                delay,
            )
        })
        .collect())
}
