//! Configuration for the traffic event model.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use topostress_topology::{Topology, TopologyModel};

/// How a payload picks its next hop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingPolicy {
    /// Deliver straight to the destination. Destinations are always
    /// neighbors of the sender, so this is a single hop.
    #[default]
    Direct,

    /// Greedy dimension-order routing over a torus grid, one axis step per
    /// hop.
    Greedy,
}

impl RoutingPolicy {
    /// Natural policy for a topology model: greedy on grids, direct
    /// elsewhere.
    pub fn default_for(model: &TopologyModel) -> Self {
        if model.is_grid() {
            RoutingPolicy::Greedy
        } else {
            RoutingPolicy::Direct
        }
    }
}

/// What a node does with a payload that reached its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrivalPolicy {
    /// Apply the state change and stop.
    #[default]
    Consume,

    /// Apply the state change, then send the payload again to self one time
    /// step later. Keeps one payload alive per arrival forever.
    Reoriginate,
}

/// When the payload emitted by a timer is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadTiming {
    /// Same instant as the re-armed timer.
    #[default]
    SharedDelay,

    /// A second, independently drawn delay.
    IndependentDelay,
}

macro_rules! policy_str {
    ($ty:ty, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Canonical name, as accepted by `FromStr`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(ConfigError::UnknownPolicy {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

policy_str!(RoutingPolicy, "routing", { Direct => "direct", Greedy => "greedy" });
policy_str!(ArrivalPolicy, "arrival", { Consume => "consume", Reoriginate => "reoriginate" });
policy_str!(PayloadTiming, "payload timing", {
    SharedDelay => "shared-delay",
    IndependentDelay => "independent-delay",
});

/// Parameters of the traffic model shared by every node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Mean of the exponential inter-event delay, in ticks.
    pub mean_time: f64,

    /// Initial size of every node's simulated state, in bytes.
    pub state_size: usize,

    /// Percentage by which an arriving payload grows or shrinks state.
    pub percent_state_size_change: f64,

    /// Percentage of state bytes an arriving payload overwrites.
    pub percent_state_change: f64,

    pub routing: RoutingPolicy,
    pub arrival: ArrivalPolicy,
    pub payload_timing: PayloadTiming,

    /// Delay added per forwarding hop and per re-origination, in ticks.
    pub fixed_time_step: u64,

    /// Timers each node arms in `initialize`.
    pub initial_timers: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mean_time: 10.0,
            state_size: 100,
            percent_state_size_change: 5.0,
            percent_state_change: 10.0,
            routing: RoutingPolicy::default(),
            arrival: ArrivalPolicy::default(),
            payload_timing: PayloadTiming::default(),
            fixed_time_step: 1,
            initial_timers: 1,
        }
    }
}

impl ModelConfig {
    /// Default configuration with the routing policy suited to `model`.
    pub fn for_model(model: &TopologyModel) -> Self {
        Self::default().with_routing(RoutingPolicy::default_for(model))
    }

    /// Set the mean inter-event delay.
    pub fn with_mean_time(mut self, mean_time: f64) -> Self {
        self.mean_time = mean_time;
        self
    }

    /// Set the initial state size in bytes.
    pub fn with_state_size(mut self, state_size: usize) -> Self {
        self.state_size = state_size;
        self
    }

    /// Set the payload percentages.
    pub fn with_percentages(mut self, state_size_change: f64, state_change: f64) -> Self {
        self.percent_state_size_change = state_size_change;
        self.percent_state_change = state_change;
        self
    }

    pub fn with_routing(mut self, routing: RoutingPolicy) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_arrival(mut self, arrival: ArrivalPolicy) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn with_payload_timing(mut self, payload_timing: PayloadTiming) -> Self {
        self.payload_timing = payload_timing;
        self
    }

    /// Set the per-hop time step.
    pub fn with_fixed_time_step(mut self, ticks: u64) -> Self {
        self.fixed_time_step = ticks;
        self
    }

    /// Set how many timers each node arms at start.
    pub fn with_initial_timers(mut self, count: u32) -> Self {
        self.initial_timers = count;
        self
    }

    /// Check values that do not depend on the topology.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mean_time.is_finite() && self.mean_time > 0.0) {
            return Err(ConfigError::InvalidMeanTime(self.mean_time));
        }
        for (name, value) in [
            ("percent state size change", self.percent_state_size_change),
            ("percent state change", self.percent_state_change),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidPercentage { name, value });
            }
        }
        if self.fixed_time_step == 0 {
            return Err(ConfigError::ZeroTimeStep);
        }
        if self.initial_timers == 0 {
            return Err(ConfigError::ZeroInitialTimers);
        }
        Ok(())
    }

    /// Check this configuration against the topology it will run on.
    pub fn validate_for(&self, topology: &Topology) -> Result<(), ConfigError> {
        self.validate()?;
        if self.routing == RoutingPolicy::Greedy && topology.grid().is_none() {
            return Err(ConfigError::GreedyRoutingWithoutGrid(
                topology.model().kind_name().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topostress_topology::TopologyBuilder;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.mean_time, 10.0);
        assert_eq!(config.state_size, 100);
        assert_eq!(config.fixed_time_step, 1);
        assert_eq!(config.arrival, ArrivalPolicy::Consume);
        assert_eq!(config.payload_timing, PayloadTiming::SharedDelay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_routing_default_follows_model() {
        let grid = TopologyModel::grid(2, 3);
        let ring = TopologyModel::SmallWorld { k: 4, beta: 0.1 };
        assert_eq!(ModelConfig::for_model(&grid).routing, RoutingPolicy::Greedy);
        assert_eq!(ModelConfig::for_model(&ring).routing, RoutingPolicy::Direct);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            ModelConfig::default().with_mean_time(0.0).validate(),
            Err(ConfigError::InvalidMeanTime(0.0))
        );
        assert!(matches!(
            ModelConfig::default().with_mean_time(f64::NAN).validate(),
            Err(ConfigError::InvalidMeanTime(_))
        ));
        assert!(matches!(
            ModelConfig::default().with_percentages(101.0, 10.0).validate(),
            Err(ConfigError::InvalidPercentage { value, .. }) if value == 101.0
        ));
        assert_eq!(
            ModelConfig::default().with_fixed_time_step(0).validate(),
            Err(ConfigError::ZeroTimeStep)
        );
        assert_eq!(
            ModelConfig::default().with_initial_timers(0).validate(),
            Err(ConfigError::ZeroInitialTimers)
        );
    }

    #[test]
    fn test_greedy_needs_grid() {
        let topology = TopologyBuilder::new(TopologyModel::SmallWorld { k: 2, beta: 0.0 })
            .with_seed(1)
            .build_indexed(6)
            .unwrap();
        let config = ModelConfig::default().with_routing(RoutingPolicy::Greedy);
        assert_eq!(
            config.validate_for(&topology),
            Err(ConfigError::GreedyRoutingWithoutGrid("Watts-Strogatz".into()))
        );
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Greedy".parse::<RoutingPolicy>(), Ok(RoutingPolicy::Greedy));
        assert_eq!(
            "reoriginate".parse::<ArrivalPolicy>(),
            Ok(ArrivalPolicy::Reoriginate)
        );
        assert_eq!(
            "independent-delay".parse::<PayloadTiming>(),
            Ok(PayloadTiming::IndependentDelay)
        );
        assert_eq!(
            "bounce".parse::<ArrivalPolicy>(),
            Err(ConfigError::UnknownPolicy {
                kind: "arrival",
                value: "bounce".into()
            })
        );
        assert_eq!(PayloadTiming::SharedDelay.to_string(), "shared-delay");
    }
}
