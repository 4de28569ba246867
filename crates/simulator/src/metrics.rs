//! Metrics collection and the end-of-run report.

use hdrhistogram::Histogram;
use topostress_simulation::{SimulationStats, StopReason};
use topostress_types::{Envelope, Event, Timestamp};

/// Records per-envelope metrics while the runner delivers events.
pub struct MetricsCollector {
    /// Hops travelled by payloads at their destination.
    arrival_hops: Histogram<u64>,
    /// Payload hops delivered to each node.
    deliveries: Vec<u64>,
    /// Approximate bytes of every delivered envelope.
    bytes_delivered: u64,
}

impl MetricsCollector {
    pub fn new(node_count: usize) -> Self {
        Self {
            arrival_hops: Histogram::new(3).expect("histogram creation should succeed"),
            deliveries: vec![0; node_count],
            bytes_delivered: 0,
        }
    }

    /// Record one delivered envelope.
    pub fn record(&mut self, envelope: &Envelope) {
        self.bytes_delivered += envelope.size() as u64;
        let Event::Payload(payload) = &envelope.event else {
            return;
        };
        if let Some(count) = self.deliveries.get_mut(envelope.receiver.as_usize()) {
            *count += 1;
        }
        if payload.destination == envelope.receiver {
            let _ = self.arrival_hops.record(u64::from(payload.hop_count));
        }
    }

    /// Build the report for a finished run.
    pub fn finish(
        self,
        seed: u64,
        stop_reason: StopReason,
        end: Timestamp,
        stats: SimulationStats,
        state_bytes: u64,
    ) -> SimulationReport {
        let mut per_node = Histogram::new(3).expect("histogram creation should succeed");
        for &count in &self.deliveries {
            let _ = per_node.record(count);
        }
        SimulationReport {
            seed,
            node_count: self.deliveries.len(),
            stop_reason,
            end,
            stats,
            state_bytes,
            bytes_delivered: self.bytes_delivered,
            arrival_hops: self.arrival_hops,
            deliveries_per_node: per_node,
        }
    }
}

/// Summary of a completed simulation run.
pub struct SimulationReport {
    pub seed: u64,
    pub node_count: usize,
    pub stop_reason: StopReason,
    /// Simulation time of the last processed event.
    pub end: Timestamp,
    pub stats: SimulationStats,
    /// Combined size of all nodes' simulated state at the end.
    pub state_bytes: u64,
    /// Approximate bytes of all envelopes handled, timers included.
    pub bytes_delivered: u64,
    pub arrival_hops: Histogram<u64>,
    pub deliveries_per_node: Histogram<u64>,
}

impl SimulationReport {
    /// Events processed per simulated tick.
    pub fn events_per_tick(&self) -> f64 {
        if self.end.ticks() == 0 {
            0.0
        } else {
            self.stats.events_processed as f64 / self.end.ticks() as f64
        }
    }

    /// Mean hop count of arrived payloads.
    pub fn mean_hops(&self) -> f64 {
        self.arrival_hops.mean()
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Simulation Report ===");
        println!("Seed: {}", self.seed);
        println!("Nodes: {}", self.node_count);
        println!("Stopped: {:?} at {}", self.stop_reason, self.end);
        println!();

        println!("Events:");
        println!("  Processed: {}", self.stats.events_processed);
        println!("  Timers: {}", self.stats.timers_processed);
        println!("  Payload hops: {}", self.stats.payloads_delivered);
        println!("  Arrivals: {}", self.stats.payloads_arrived);
        println!("  Per tick: {:.2}", self.events_per_tick());
        println!("  Peak queue: {}", self.stats.peak_queue_len);
        println!("  Bytes: {}", self.bytes_delivered);
        println!();

        if !self.arrival_hops.is_empty() {
            println!("Hops at arrival:");
            println!("  Mean: {:.2}", self.mean_hops());
            println!("  P50: {}", self.arrival_hops.value_at_quantile(0.50));
            println!("  P99: {}", self.arrival_hops.value_at_quantile(0.99));
            println!("  Max: {}", self.arrival_hops.max());
            println!();
        }

        println!("Payload hops per node:");
        println!("  Min: {}", self.deliveries_per_node.min());
        println!("  Mean: {:.2}", self.deliveries_per_node.mean());
        println!("  Max: {}", self.deliveries_per_node.max());
        println!();

        println!("State bytes: {}", self.state_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topostress_types::{NodeIndex, PayloadEvent};

    fn payload(sender: u32, receiver: u32, destination: u32, hop_count: u32) -> Envelope {
        Envelope::payload(
            NodeIndex(sender),
            NodeIndex(receiver),
            PayloadEvent {
                destination: NodeIndex(destination),
                hop_count,
                percent_state_size_change: 0.0,
                percent_state_change: 0.0,
                timestamp: Timestamp(4),
            },
        )
    }

    #[test]
    fn test_records_arrivals_and_deliveries() {
        let mut metrics = MetricsCollector::new(4);
        metrics.record(&Envelope::timer(NodeIndex(0), Timestamp(1)));
        metrics.record(&payload(0, 1, 3, 1));
        metrics.record(&payload(1, 3, 3, 2));
        metrics.record(&payload(2, 3, 3, 5));

        let report = metrics.finish(
            9,
            StopReason::EndTime,
            Timestamp(10),
            SimulationStats {
                events_processed: 4,
                ..Default::default()
            },
            400,
        );
        assert_eq!(report.arrival_hops.len(), 2);
        assert_eq!(report.arrival_hops.max(), 5);
        assert_eq!(report.mean_hops(), 3.5);
        assert_eq!(report.deliveries_per_node.len(), 4);
        assert_eq!(report.deliveries_per_node.max(), 2);
        assert_eq!(report.deliveries_per_node.min(), 0);
        assert_eq!(report.events_per_tick(), 0.4);

        let timer = Envelope::timer(NodeIndex(0), Timestamp(1)).size() as u64;
        let hop = payload(0, 1, 3, 1).size() as u64;
        assert!(hop > timer);
        assert_eq!(report.bytes_delivered, timer + 3 * hop);
    }
}
