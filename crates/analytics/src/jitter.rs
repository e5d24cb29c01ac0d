//! Bounded random multipliers for projections.
//!
//! Projections take a `Jitter` so callers decide between a seeded RNG and a
//! fixed value. Nothing here is global; every request builds its own source.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of multipliers in a closed range.
pub trait Jitter {
    /// Returns a value in `[low, high]`. Implementations must tolerate `low == high`.
    fn multiplier(&mut self, low: f64, high: f64) -> f64;
}

/// ChaCha8-backed jitter; seeded for reproducible runs, entropy otherwise.
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: ChaCha8Rng,
}

impl SeededJitter {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }
}

impl Jitter for SeededJitter {
    fn multiplier(&mut self, low: f64, high: f64) -> f64 {
        if high > low {
            self.rng.gen_range(low..=high)
        } else {
            low
        }
    }
}

/// Always returns the same value, clamped into the requested range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f64);

impl FixedJitter {
    /// No jitter at all.
    pub const NEUTRAL: Self = Self(1.0);
}

impl Jitter for FixedJitter {
    fn multiplier(&mut self, low: f64, high: f64) -> f64 {
        self.0.clamp(low, high.max(low))
    }
}
