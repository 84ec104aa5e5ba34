//! Random source abstraction.
//!
//! The engine's only source of non-determinism. Everything that rolls dice
//! (interval jitter, burst checks, kind selection, payload sampling) goes
//! through a [`RandomSource`], so a fixed seed plus a fixed `dt` sequence
//! replays the same feed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Minimal uniform random interface used by the engine and samplers.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn next01(&mut self) -> f64;

    /// Uniform float in `[a, b)`. Returns `a` when the range is empty.
    fn range(&mut self, a: f64, b: f64) -> f64 {
        if b <= a {
            return a;
        }
        lerp(a, b, self.next01())
    }

    /// Uniform integer in `[a, b_exclusive)`. Returns `a` when the range is empty.
    fn range_int(&mut self, a: i64, b_exclusive: i64) -> i64;
}

/// Seedable random source backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: Option<u64>,
    inner: StdRng,
}

impl SeededRandom {
    /// Create a reproducible source from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a non-reproducible source seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            seed: None,
            inner: StdRng::from_entropy(),
        }
    }

    /// The seed this source was created with, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next01(&mut self) -> f64 {
        self.inner.r#gen::<f64>()
    }

    fn range(&mut self, a: f64, b: f64) -> f64 {
        if b <= a || !a.is_finite() || !b.is_finite() {
            return a;
        }
        if !(b - a).is_finite() {
            // Span overflows f64; `gen_range` would panic.
            return lerp(a, b, self.next01());
        }
        self.inner.gen_range(a..b)
    }

    fn range_int(&mut self, a: i64, b_exclusive: i64) -> i64 {
        if b_exclusive <= a {
            return a;
        }
        self.inner.gen_range(a..b_exclusive)
    }
}

/// `a + (b - a) * t` without forming `b - a`, so it stays finite for any
/// finite endpoints.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next01(&mut self) -> f64 {
        (**self).next01()
    }

    fn range(&mut self, a: f64, b: f64) -> f64 {
        (**self).range(a, b)
    }

    fn range_int(&mut self, a: i64, b_exclusive: i64) -> i64 {
        (**self).range_int(a, b_exclusive)
    }
}
