//! Randomness for probabilistic rules
//!
//! Uses a seeded ChaCha RNG so that variant runs are reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::Address;

/// Random source injected into rule application
///
/// Wraps ChaCha8Rng. The seed is kept so a run can be logged and replayed.
#[derive(Debug, Clone)]
pub struct VariantRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl VariantRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Weighted two-outcome draw: returns `a` with probability `probability_a`,
    /// `b` otherwise.
    ///
    /// `probability_a` must lie in [0, 1]; rules validate this when built.
    pub fn biased_choice<T>(&mut self, a: T, b: T, probability_a: f64) -> T {
        if self.rng.gen_bool(probability_a) { a } else { b }
    }

    /// Uniform address in `start..end`.
    ///
    /// Returns `start` if the range is empty.
    pub fn address_in(&mut self, start: Address, end: Address) -> Address {
        if end <= start {
            return start;
        }
        self.rng.gen_range(start..end)
    }
}

impl Default for VariantRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
