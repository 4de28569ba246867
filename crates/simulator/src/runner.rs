//! Simulator runner that wraps a topology and a traffic simulation.

use crate::config::SimulatorConfig;
use crate::metrics::{MetricsCollector, SimulationReport};
use crate::SimulatorError;
use std::sync::Arc;
use std::time::Instant;
use topostress_simulation::SimulationRunner;
use topostress_topology::{Topology, TopologyBuilder};
use topostress_types::Timestamp;
use tracing::info;

/// Builds the topology and nodes for one run and drives them to completion.
pub struct Simulator {
    config: SimulatorConfig,
    seed: u64,
    topology: Arc<Topology>,
    runner: SimulationRunner,
}

impl Simulator {
    /// Validate `config`, generate the topology and create every node.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let node_count = config.node_count()?;

        let started = Instant::now();
        let topology = TopologyBuilder::new(config.topology.clone())
            .with_seed(seed)
            .build_indexed(node_count)?
            .into_arc();
        let degrees = topology.degree_stats();
        info!(
            nodes = topology.len(),
            edges = topology.edge_count(),
            min_degree = degrees.min,
            max_degree = degrees.max,
            mean_degree = degrees.mean,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Topology ready"
        );

        let mut runner = SimulationRunner::traffic(&topology, &config.model, seed)?;
        if let Some(max_events) = config.max_events {
            runner = runner.with_event_budget(max_events);
        }

        Ok(Self {
            config,
            seed,
            topology,
            runner,
        })
    }

    /// The seed in use, drawn at construction when the config had none.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Run to the configured end time or event budget.
    pub fn run(&mut self) -> SimulationReport {
        let mut metrics = MetricsCollector::new(self.topology.len());
        let started = Instant::now();
        let stop_reason = self
            .runner
            .run_until_observed(Timestamp(self.config.end_time), |envelope| {
                metrics.record(envelope)
            });

        let stats = self.runner.stats().clone();
        info!(
            events = stats.events_processed,
            arrivals = stats.payloads_arrived,
            sim_time = self.runner.now().ticks(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            reason = ?stop_reason,
            "Simulation complete"
        );

        let state_bytes = self
            .runner
            .nodes()
            .iter()
            .map(|node| node.state().len() as u64)
            .sum();
        metrics.finish(self.seed, stop_reason, self.runner.now(), stats, state_bytes)
    }
}
