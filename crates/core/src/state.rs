//! Simulated per-node state touched by arriving payloads.

use rand::Rng;

/// A byte buffer standing in for a logical process's model state.
///
/// Payloads grow, shrink and rewrite it so the kernel has real state to save
/// and restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpState {
    bytes: Vec<u8>,
    base_size: usize,
}

impl LpState {
    /// A zeroed buffer of `size` bytes. The size also fixes the growth
    /// step and the upper bound of `2 * size`.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            base_size: size,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Resize by `size_pct` percent of the base size, in a random direction,
    /// then overwrite `change_pct` percent of the bytes at random positions.
    pub fn apply_change<R: Rng + ?Sized>(&mut self, size_pct: f64, change_pct: f64, rng: &mut R) {
        if self.base_size == 0 {
            return;
        }

        let step = percent_of(self.base_size, size_pct);
        if step > 0 {
            let grow = rng.gen_bool(0.5);
            let len = if grow {
                self.bytes.len().saturating_add(step)
            } else {
                self.bytes.len().saturating_sub(step)
            };
            self.bytes.resize(len.clamp(1, 2 * self.base_size), 0);
        }

        let touched = percent_of(self.bytes.len(), change_pct);
        for _ in 0..touched {
            let position = rng.gen_range(0..self.bytes.len());
            self.bytes[position] = rng.gen();
        }
    }
}

fn percent_of(len: usize, pct: f64) -> usize {
    (len as f64 * pct / 100.0).ceil().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_resize_stays_in_bounds() {
        let mut state = LpState::new(100);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..500 {
            state.apply_change(40.0, 10.0, &mut rng);
            assert!((1..=200).contains(&state.len()), "len {}", state.len());
        }
    }

    #[test]
    fn test_step_is_a_percentage_of_base_size() {
        let mut state = LpState::new(100);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        state.apply_change(5.0, 0.0, &mut rng);
        assert!(state.len() == 95 || state.len() == 105);
        assert!(state.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_change_rewrites_bytes() {
        let mut state = LpState::new(64);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        state.apply_change(0.0, 100.0, &mut rng);
        assert_eq!(state.len(), 64);
        assert!(state.as_bytes().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_empty_state_is_untouched() {
        let mut state = LpState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        state.apply_change(50.0, 50.0, &mut rng);
        assert!(state.is_empty());
    }
}
