//! Parameters of local-search gene mutation

use crate::randomness::Randomness;
use serde::{Deserialize, Serialize};

const MAX_EXPONENT: u32 = 62;

/// Controls how far a single mutation may move a value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationContext {
    /// Largest exponent `i` of a `2^i` numeric delta
    pub max_delta_exponent: u32,
    /// Probability of fully re-randomizing a scalar instead of moving it locally
    pub probability_of_randomization: f64,
}

impl Default for MutationContext {
    fn default() -> Self {
        Self {
            max_delta_exponent: 30,
            probability_of_randomization: 0.05,
        }
    }
}

impl MutationContext {
    /// Context with the given delta exponent and the default randomization probability
    pub fn with_max_delta_exponent(max_delta_exponent: u32) -> Self {
        Self {
            max_delta_exponent,
            ..Self::default()
        }
    }

    /// Pick a power-of-two step no larger than `range`.
    ///
    /// The exponent is drawn uniformly from `0..=n`, where `2^n` is the
    /// largest power of two that fits both `range` and `max_delta_exponent`.
    /// Returns 0 only when `range` is 0.
    pub fn numeric_delta(&self, rng: &mut Randomness, range: u64) -> u64 {
        if range == 0 {
            return 0;
        }
        let cap = self.max_delta_exponent.min(MAX_EXPONENT);
        let mut n = 0u32;
        while n < cap && (1u64 << (n + 1)) <= range {
            n += 1;
        }
        let exponent = rng.choose_up_to(n as usize) as u32;
        1u64 << exponent
    }
}
