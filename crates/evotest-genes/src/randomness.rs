//! Seeded randomness service
//!
//! Every stochastic decision of the search (sampling, gene choice, mutation
//! direction, probabilistic acceptance) is drawn from a [`Randomness`]
//! instance, so two runs with the same seed replay identically.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

const WORD_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-";

/// Seeded pseudo-random source
#[derive(Debug, Clone)]
pub struct Randomness {
    rng: StdRng,
    seed: u64,
}

impl Randomness {
    /// Create a new source from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Restart the sequence from the given seed
    pub fn reset(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = seed;
    }

    /// Seed this source was last initialized with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fair coin flip
    pub fn next_bool(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// True with probability `p`; values outside `[0,1]` saturate
    pub fn next_bool_with(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.rng.gen_bool(p)
    }

    /// Uniform `i32` in `[min, max]` (inclusive)
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform integer in `[min, max]` (inclusive). Returns `min` when the range is empty.
    pub fn next_i64(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform `usize` in `[min, max]` (inclusive)
    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform index into a collection of `len` elements
    pub fn next_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.gen_range(0..len))
        }
    }

    /// Uniform float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform float in `[min, max]`
    pub fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        if min.is_nan() || max.is_nan() || min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform integer in `[0, n]`
    pub fn choose_up_to(&mut self, n: usize) -> usize {
        self.next_usize(0, n)
    }

    /// Pick one element uniformly
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Pick an index with probability proportional to its weight.
    ///
    /// Returns `None` if the weights are empty, all zero, or contain a
    /// negative/non-finite value.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.rng))
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Random character from the word charset
    pub fn next_char(&mut self) -> char {
        let idx = self.rng.gen_range(0..WORD_CHARSET.len());
        WORD_CHARSET[idx] as char
    }

    /// Random character different from `current`
    pub fn next_char_except(&mut self, current: char) -> char {
        loop {
            let c = self.next_char();
            if c != current {
                return c;
            }
        }
    }

    /// Random word with a length in `[min_len, max_len]`
    pub fn next_word(&mut self, min_len: usize, max_len: usize) -> String {
        let len = self.next_usize(min_len, max_len);
        (0..len).map(|_| self.next_char()).collect()
    }
}

impl Default for Randomness {
    fn default() -> Self {
        Self::new(42)
    }
}
