//! Per-node random streams and the inter-event delay distribution.

use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use topostress_types::NodeIndex;

/// The generator owned by `node` for a run seeded with `seed`.
///
/// Every node reads its own ChaCha8 stream of the same key, so draws never
/// depend on the order in which nodes are scheduled.
pub fn node_rng(seed: u64, node: NodeIndex) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(node.get()));
    rng
}

/// Exponential distribution over delays with the given mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDelay {
    mean: f64,
}

impl ExponentialDelay {
    /// Callers validate that `mean` is positive and finite.
    pub fn new(mean: f64) -> Self {
        debug_assert!(mean.is_finite() && mean > 0.0);
        Self { mean }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Draw a delay and round it up to whole ticks.
    pub fn ticks<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        quantize_delay(self.sample(rng))
    }
}

impl Distribution<f64> for ExponentialDelay {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // Inverse CDF; `gen` is in [0, 1) so the log argument stays positive.
        let u: f64 = rng.gen();
        -self.mean * (1.0 - u).ln()
    }
}

/// Round a real-valued delay up to whole ticks, never below one.
pub fn quantize_delay(delay: f64) -> u64 {
    let ticks = delay.ceil();
    if ticks >= u64::MAX as f64 {
        u64::MAX
    } else if ticks < 1.0 {
        1
    } else {
        ticks as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_streams_are_independent() {
        let mut a = node_rng(42, NodeIndex(0));
        let mut b = node_rng(42, NodeIndex(1));
        let mut a_again = node_rng(42, NodeIndex(0));

        let first: Vec<u64> = (0..8).map(|_| a.gen()).collect();
        let other: Vec<u64> = (0..8).map(|_| b.gen()).collect();
        let repeat: Vec<u64> = (0..8).map(|_| a_again.gen()).collect();
        assert_eq!(first, repeat);
        assert_ne!(first, other);
    }

    #[test]
    fn test_exponential_mean() {
        let delay = ExponentialDelay::new(10.0);
        let mut rng = node_rng(7, NodeIndex(3));
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| delay.sample(&mut rng)).sum();
        let mean = sum / n as f64;
        assert!((mean - 10.0).abs() < 0.5, "mean {mean}");
    }

    #[test]
    fn test_samples_are_non_negative() {
        let delay = ExponentialDelay::new(0.5);
        let mut rng = node_rng(1, NodeIndex(0));
        for _ in 0..1000 {
            assert!(delay.sample(&mut rng) >= 0.0);
            assert!(delay.ticks(&mut rng) >= 1);
        }
    }

    #[test]
    fn test_quantize_delay() {
        assert_eq!(quantize_delay(0.0), 1);
        assert_eq!(quantize_delay(0.2), 1);
        assert_eq!(quantize_delay(2.0), 2);
        assert_eq!(quantize_delay(2.01), 3);
        assert_eq!(quantize_delay(f64::INFINITY), u64::MAX);
    }
}
