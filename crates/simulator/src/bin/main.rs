//! Topostress Simulator CLI
//!
//! Generate a topology and run synthetic traffic over it.
//!
//! # Example
//!
//! ```bash
//! # Small-world network with a fixed seed
//! topostress-sim -n 10000 -t Watts-Strogatz -p 30,0.1 --seed 42
//!
//! # 3-dimensional torus, 20 nodes per axis, payloads bounce forever
//! topostress-sim -t torus -d 3 --grid-size 20 --arrival reoriginate -e 200
//!
//! # Everything from a file, seed overridden
//! topostress-sim -c run.toml --seed 7
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use topostress_core::{ArrivalPolicy, PayloadTiming, RoutingPolicy};
use topostress_simulator::{Simulator, SimulatorConfig};
use topostress_topology::TopologyModel;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_NETWORK_PARAMS: &str = "30,0.1";
const DEFAULT_GRID_DIMENSION: u32 = 5;
const DEFAULT_GRID_SIZE: u32 = 1000;
const DEFAULT_GRID_ORDER: u32 = 1;

/// Topostress Simulator
///
/// Runs synthetic traffic over a generated topology. Single-threaded,
/// reproducible when the same seed is used. Flags override values loaded
/// with --config.
#[derive(Parser, Debug)]
#[command(name = "topostress-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of nodes (ignored by grid topologies) [default: 100000]
    #[arg(short = 'n', long)]
    num_nodes: Option<usize>,

    /// Network type: Watts-Strogatz, Barabasi-Albert or Torus [default: Watts-Strogatz]
    #[arg(short = 't', long)]
    network_type: Option<String>,

    /// Comma-separated network parameters: k,beta | m,a | dimensions,extent[,order]
    /// [default: 30,0.1]
    #[arg(short = 'p', long)]
    network_params: Option<String>,

    /// Grid dimensions, used with -t Torus when --network-params is absent [default: 5]
    #[arg(short = 'd', long)]
    grid_dimension: Option<u32>,

    /// Grid nodes per axis, used when --network-params is absent [default: 1000]
    #[arg(long)]
    grid_size: Option<u32>,

    /// Grid adjacency order, used when --network-params is absent [default: 1]
    #[arg(short = 'o', long)]
    grid_order: Option<u32>,

    /// Mean time between timer events [default: 10]
    #[arg(short = 'm', long)]
    mean_time: Option<f64>,

    /// Initial state size in bytes [default: 100]
    #[arg(short = 's', long)]
    state_size: Option<usize>,

    /// Percent state size change per arriving payload [default: 5.0]
    #[arg(short = 'g', long)]
    percent_state_size_change: Option<f64>,

    /// Percent of state bytes changed per arriving payload [default: 10.0]
    #[arg(short = 'f', long)]
    percent_state_change: Option<f64>,

    /// Payload routing: direct or greedy [default: greedy on grids, direct otherwise]
    #[arg(long)]
    routing: Option<RoutingPolicy>,

    /// What to do on arrival: consume or reoriginate [default: consume]
    #[arg(long)]
    arrival: Option<ArrivalPolicy>,

    /// Payload delivery time: shared-delay or independent-delay [default: shared-delay]
    #[arg(long)]
    payload_timing: Option<PayloadTiming>,

    /// Timers armed per node at start [default: 1]
    #[arg(long)]
    initial_timers: Option<u32>,

    /// Ticks per forwarding hop [default: 1]
    #[arg(long)]
    time_step: Option<u64>,

    /// Simulation end time in ticks [default: 1000]
    #[arg(short = 'e', long)]
    end_time: Option<u64>,

    /// Stop after this many events
    #[arg(long)]
    max_events: Option<u64>,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    /// The topology selected on the command line, if any flag names one.
    fn topology(&self, current: &TopologyModel) -> Result<Option<TopologyModel>> {
        let grid_flags =
            self.grid_dimension.is_some() || self.grid_size.is_some() || self.grid_order.is_some();
        if self.network_type.is_none() && self.network_params.is_none() && !grid_flags {
            return Ok(None);
        }

        let kind = self
            .network_type
            .as_deref()
            .unwrap_or(current.kind_name());
        if grid_flags && !TopologyModel::is_grid_name(kind) {
            bail!("--grid-dimension, --grid-size and --grid-order need -t Torus, not {kind:?}");
        }
        // Grid flags adjust a grid loaded from --config rather than replace it.
        let (dimensions, extent, order) = match *current {
            TopologyModel::Grid {
                dimensions,
                extent,
                order,
            } => (dimensions, extent, order),
            _ => (DEFAULT_GRID_DIMENSION, DEFAULT_GRID_SIZE, DEFAULT_GRID_ORDER),
        };
        let params = match &self.network_params {
            Some(params) => params.clone(),
            None if TopologyModel::is_grid_name(kind) => format!(
                "{},{},{}",
                self.grid_dimension.unwrap_or(dimensions),
                self.grid_size.unwrap_or(extent),
                self.grid_order.unwrap_or(order),
            ),
            None => DEFAULT_NETWORK_PARAMS.to_string(),
        };
        let model = TopologyModel::parse(kind, &params)
            .with_context(|| format!("Invalid network selection: -t {kind:?} -p {params:?}"))?;
        Ok(Some(model))
    }

    /// Apply command-line overrides on top of `config`.
    fn apply(&self, mut config: SimulatorConfig) -> Result<SimulatorConfig> {
        if let Some(topology) = self.topology(&config.topology)? {
            if self.routing.is_none() {
                config.model.routing = RoutingPolicy::default_for(&topology);
            }
            config.topology = topology;
        }
        if let Some(num_nodes) = self.num_nodes {
            config.num_nodes = num_nodes;
        }

        let model = &mut config.model;
        if let Some(mean_time) = self.mean_time {
            model.mean_time = mean_time;
        }
        if let Some(state_size) = self.state_size {
            model.state_size = state_size;
        }
        if let Some(pct) = self.percent_state_size_change {
            model.percent_state_size_change = pct;
        }
        if let Some(pct) = self.percent_state_change {
            model.percent_state_change = pct;
        }
        if let Some(routing) = self.routing {
            model.routing = routing;
        }
        if let Some(arrival) = self.arrival {
            model.arrival = arrival;
        }
        if let Some(timing) = self.payload_timing {
            model.payload_timing = timing;
        }
        if let Some(count) = self.initial_timers {
            model.initial_timers = count;
        }
        if let Some(step) = self.time_step {
            model.fixed_time_step = step;
        }

        if let Some(end_time) = self.end_time {
            config.end_time = end_time;
        }
        if let Some(max_events) = self.max_events {
            config.max_events = Some(max_events);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("warn,topostress_simulator=info,topostress_sim=info")
            }),
        )
        .init();

    let args = Args::parse();

    let base = match &args.config {
        Some(path) => SimulatorConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => SimulatorConfig::default(),
    };
    let mut config = args.apply(base)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    info!(
        topology = %config.topology,
        num_nodes = config.num_nodes,
        end_time = config.end_time,
        mean_time = config.model.mean_time,
        routing = %config.model.routing,
        arrival = %config.model.arrival,
        seed,
        "Starting simulation"
    );

    let mut simulator = Simulator::new(config).context("Failed to create simulator")?;
    let report = simulator.run();
    report.print_summary();
    Ok(())
}
