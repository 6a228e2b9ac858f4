//! Seeded random source shared by genomes and pools.
//!
//! Every genome and pool owns its own [`Randomizer`]. New randomizers are
//! forked from existing ones with `Randomizer::new(parent.next_long())`, so a
//! whole evolutionary run replays bit-for-bit from a single seed without any
//! randomizer being shared between owners.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::NeatError;

/// A deterministic pseudo-random stream.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: ChaCha8Rng,
}

impl Randomizer {
    /// Create a randomizer from a seed.
    #[must_use]
    pub fn new(seed: i64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed as u64),
        }
    }

    /// Draw a full-range signed 64-bit value, typically used as a seed.
    pub fn next_long(&mut self) -> i64 {
        self.rng.random::<i64>()
    }

    /// Draw a uniform value in `[0, 1)`.
    pub fn next_double(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Draw a fair coin flip.
    pub fn next_boolean(&mut self) -> bool {
        self.rng.random::<bool>()
    }

    /// Draw a uniform index in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero. Callers check for empty candidate lists
    /// before sampling.
    pub fn next_int(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "next_int bound must be positive");
        self.rng.random_range(0..bound)
    }

    /// Draw a uniform value in `[floor, ceiling)`.
    ///
    /// A degenerate range where `floor == ceiling` always yields `floor`.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidConfiguration`] if `floor > ceiling` or
    /// either bound is not finite.
    pub fn next_double_in(&mut self, floor: f64, ceiling: f64) -> Result<f64, NeatError> {
        if !(floor.is_finite() && ceiling.is_finite() && floor <= ceiling) {
            return Err(NeatError::InvalidConfiguration { floor, ceiling });
        }
        if floor == ceiling {
            return Ok(floor);
        }
        // Interpolated so that `ceiling - floor` never overflows.
        let r = self.next_double();
        let value = (floor * (1.0 - r) + ceiling * r).max(floor);
        // Rounding can land exactly on the ceiling.
        if value >= ceiling {
            return Ok(floor);
        }
        Ok(value)
    }

    /// Fork an independent randomizer seeded from this stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_long())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Randomizer::new(42);
        let mut b = Randomizer::new(42);

        for _ in 0..100 {
            assert_eq!(a.next_long(), b.next_long());
            assert_eq!(a.next_double().to_bits(), b.next_double().to_bits());
            assert_eq!(a.next_boolean(), b.next_boolean());
            assert_eq!(a.next_int(17), b.next_int(17));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Randomizer::new(1);
        let mut b = Randomizer::new(2);
        let same = (0..32).filter(|_| a.next_long() == b.next_long()).count();
        assert!(same < 32);
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut a = Randomizer::new(7);
        let mut b = Randomizer::new(7);
        let mut fa = a.fork();
        let mut fb = b.fork();
        assert_eq!(fa.next_long(), fb.next_long());
        // The parent advanced, so it no longer matches a fresh stream.
        assert_ne!(a.next_long(), Randomizer::new(7).next_long());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut rand = Randomizer::new(0);
        assert!(matches!(
            rand.next_double_in(1.0, -1.0),
            Err(NeatError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let mut rand = Randomizer::new(0);
        assert!(rand.next_double_in(f64::NEG_INFINITY, f64::INFINITY).is_err());
        assert!(rand.next_double_in(0.0, f64::NAN).is_err());
        assert!(rand.next_double_in(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_widest_finite_range_spreads() {
        let mut rand = Randomizer::new(0);
        let draws: Vec<f64> = (0..5)
            .map(|_| rand.next_double_in(-f64::MAX, f64::MAX).unwrap())
            .collect();
        assert!(draws.iter().all(|v| v.is_finite() && *v < f64::MAX));
        assert!(draws.iter().any(|&v| v != -f64::MAX));
    }

    #[test]
    fn test_degenerate_range() {
        let mut rand = Randomizer::new(0);
        assert_eq!(rand.next_double_in(3.0, 3.0).unwrap(), 3.0);
    }

    proptest! {
        #[test]
        fn prop_bounded_double_stays_in_range(
            seed in any::<i64>(),
            floor in -1e6f64..1e6,
            width in 0.0f64..1e6,
        ) {
            let ceiling = floor + width;
            let mut rand = Randomizer::new(seed);
            for _ in 0..16 {
                let v = rand.next_double_in(floor, ceiling).unwrap();
                prop_assert!(v >= floor);
                prop_assert!(v < ceiling || ceiling == floor);
            }
        }

        #[test]
        fn prop_next_int_below_bound(seed in any::<i64>(), bound in 1usize..1000) {
            let mut rand = Randomizer::new(seed);
            for _ in 0..16 {
                prop_assert!(rand.next_int(bound) < bound);
            }
        }
    }
}
