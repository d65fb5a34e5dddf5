//! Deterministic RNG wrapper for randomized tour generation.
//!
//! # Determinism strategy
//!
//! Loop planning is a randomized search: via-point bearings and distances are
//! re-drawn on every retry.  All draws go through a single `TourRng` owned by
//! the in-flight planning request, seeded either explicitly (reproducible
//! tests, replayable requests) or from entropy (production route diversity —
//! two identical requests should not produce the identical loop).
//!
//! `TourRng` is `!Sync` by construction; concurrent requests each hold their
//! own instance, so draws never contend and never depend on scheduling order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for child-seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seedable random source for bearing/distance sampling.
pub struct TourRng(SmallRng);

impl TourRng {
    /// Seed deterministically — the same seed always reproduces the same
    /// sequence of tour plans.
    pub fn new(seed: u64) -> Self {
        TourRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from OS entropy for non-reproducible route diversity.
    pub fn from_entropy() -> Self {
        TourRng(SmallRng::from_entropy())
    }

    /// Derive a child `TourRng` with a different seed offset — useful for
    /// seeding per-request RNGs deterministically from one root seed.
    pub fn child(&mut self, offset: u64) -> TourRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        TourRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }
}
