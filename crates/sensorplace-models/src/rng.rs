use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Seeded generator behind every random tree, prior and delay draw.
pub struct TreeRng {
    rng: ChaCha20Rng,
}

impl TreeRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream for one case of a randomized sweep.
    pub fn from_case_id(global_seed: u64, case_id: u64) -> Self {
        // Combine seeds deterministically
        let seed = global_seed.wrapping_add(case_id.wrapping_mul(0x9e3779b97f4a7c15));
        Self::new(seed)
    }

    /// Uniform index in `0..upper`; `upper` must be positive.
    pub fn index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    /// Uniform integer in `low..=high`.
    pub fn between(&mut self, low: u64, high: u64) -> u64 {
        self.rng.gen_range(low..=high)
    }

    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        dist.sample(&mut self.rng)
    }

    /// Random prior weights in `1..=max_weight`.
    pub fn weights(&mut self, n: usize, max_weight: u64) -> Vec<u64> {
        let max_weight = max_weight.max(1);
        (0..n).map(|_| self.between(1, max_weight)).collect()
    }
}
