//! Deterministic randomness for the pipeline.
//!
//! Every stage draws from its own ChaCha stream whose seed is mixed from the
//! scenario seed and the stage name. Seeds depend only on that pair, so the
//! perceptor's draws are identical whether or not a planner ran first, and
//! adding draws to one stage never shifts the values another stage sees.

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> &mut ChaCha8Rng {
        let seed = derive_stream_seed(self.master_seed, name);
        self.streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Mixes the stage name into the master seed with an LCG step per byte.
fn derive_stream_seed(master_seed: u64, name: &str) -> u64 {
    const A: u64 = 6364136223846793005;
    const C: u64 = 1442695040888963407;
    let mut seed = master_seed.wrapping_mul(A).wrapping_add(C);
    for byte in name.bytes() {
        seed ^= byte as u64;
        seed = seed.wrapping_mul(A).wrapping_add(C);
    }
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngManager::new(7);
        let mut b = RngManager::new(7);
        let x: f64 = a.stream("perceptor").gen();
        let y: f64 = b.stream("perceptor").gen();
        assert_eq!(x, y);
    }

    #[test]
    fn named_streams_diverge() {
        let mut manager = RngManager::new(7);
        let x = manager.stream("perceptor").next_u64();
        let y = manager.stream("planner").next_u64();
        assert_ne!(x, y);
    }

    #[test]
    fn stream_values_ignore_touch_order() {
        let mut forward = RngManager::new(11);
        let f_perceptor = forward.stream("perceptor").next_u64();
        let f_planner = forward.stream("planner").next_u64();

        let mut reversed = RngManager::new(11);
        let r_planner = reversed.stream("planner").next_u64();
        let r_perceptor = reversed.stream("perceptor").next_u64();

        assert_eq!(f_perceptor, r_perceptor);
        assert_eq!(f_planner, r_planner);
    }

    #[test]
    fn stream_persists_across_lookups() {
        let mut manager = RngManager::new(42);
        let first = manager.stream("evaluator").next_u64();
        let second = manager.stream("evaluator").next_u64();
        assert_ne!(first, second, "stream must keep advancing, not reset");
    }

    #[test]
    fn master_seed_changes_every_stream() {
        assert_ne!(
            derive_stream_seed(1, "perceptor"),
            derive_stream_seed(2, "perceptor")
        );
        assert_ne!(
            derive_stream_seed(1, "perceptor"),
            derive_stream_seed(1, "planner")
        );
    }
}
