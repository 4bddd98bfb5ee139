use std::path::PathBuf;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Uniform random choice over a slice of paths.
#[derive(Debug, Clone)]
pub struct Picker {
    rng: StdRng,
}

impl Picker {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn choose(&mut self, pool: &[PathBuf]) -> Option<PathBuf> {
        pool.choose(&mut self.rng).cloned()
    }
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}
