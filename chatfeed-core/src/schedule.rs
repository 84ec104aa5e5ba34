//! Decision-point timing.
//!
//! Normal interval:
//!   rate     = max(ε, base_rate)
//!   jittered = rate × (1 + U(-jitter, jitter))
//!   interval = clamp(1 / jittered, min_interval, max_interval)
//!
//! Burst interval: U(a, max(a, b)) over the configured burst gap range.
//!
//! Burst entry is rolled only at decision points, with probability
//! `clamp01(chance_per_sec × max(0.05, current_interval))`, so the
//! per-second chance is independent of how often decisions happen.

use crate::config::{BurstConfig, RateConfig};
use crate::random::RandomSource;

/// Smallest rate the normal-interval formula will divide by.
pub const MIN_RATE: f64 = 1e-4;

/// Floor applied to the interval when converting burst chance per second
/// into a per-decision probability, and to the schedule after a runaway tick.
pub const MIN_DECISION_GAP: f64 = 0.05;

/// Draw the next normal (non-burst) interval.
pub fn normal_interval(rate: &RateConfig, rng: &mut dyn RandomSource) -> f64 {
    let base = if rate.base_rate_per_sec.is_finite() {
        rate.base_rate_per_sec.max(MIN_RATE)
    } else {
        MIN_RATE
    };
    let jitter = rate.jitter.abs();
    let jittered = (base * (1.0 + rng.range(-jitter, jitter))).max(MIN_RATE);
    clamp_interval(1.0 / jittered, rate.min_interval_sec, rate.max_interval_sec)
}

/// Draw the next burst interval from `[a, max(a, b)]`.
pub fn burst_interval(burst: &BurstConfig, rng: &mut dyn RandomSource) -> f64 {
    let a = burst.min_interval_sec.max(0.0);
    let b = burst.max_interval_sec.max(a);
    rng.range(a, b)
}

/// Probability of starting a burst at a decision point whose gap was
/// `current_interval` seconds.
#[must_use]
pub fn burst_start_probability(burst: &BurstConfig, current_interval: f64) -> f64 {
    let p = burst.chance_per_sec * current_interval.max(MIN_DECISION_GAP);
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Roll a burst start. Returns the burst length when one begins.
pub fn roll_burst(
    burst: &BurstConfig,
    current_interval: f64,
    rng: &mut dyn RandomSource,
) -> Option<u32> {
    let p = burst_start_probability(burst, current_interval);
    if p <= 0.0 || rng.next01() >= p {
        return None;
    }
    let lo = i64::from(burst.min_events);
    let hi = i64::from(burst.max_events.max(burst.min_events));
    let length = rng.range_int(lo, hi + 1);
    u32::try_from(length).ok().filter(|len| *len > 0)
}

/// Clamp to `[min, max]`, tolerating an inverted or degenerate range.
fn clamp_interval(value: f64, min: f64, max: f64) -> f64 {
    let lo = min.max(0.0);
    let hi = max.max(lo);
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn no_jitter_is_exact() {
        let rate = RateConfig {
            base_rate_per_sec: 2.0,
            jitter: 0.0,
            min_interval_sec: 0.1,
            max_interval_sec: 5.0,
        };
        let mut rng = SeededRandom::new(1);
        assert!((normal_interval(&rate, &mut rng) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_rate_hits_max_interval() {
        let rate = RateConfig {
            base_rate_per_sec: 0.0,
            jitter: 0.5,
            min_interval_sec: 0.1,
            max_interval_sec: 4.0,
        };
        let mut rng = SeededRandom::new(2);
        assert!((normal_interval(&rate, &mut rng) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn jitter_stays_clamped() {
        let rate = RateConfig {
            base_rate_per_sec: 3.0,
            jitter: 0.99,
            min_interval_sec: 0.2,
            max_interval_sec: 1.0,
        };
        let mut rng = SeededRandom::new(3);
        for _ in 0..1000 {
            let gap = normal_interval(&rate, &mut rng);
            assert!((0.2..=1.0).contains(&gap), "gap {gap} escaped clamp");
        }
    }

    #[test]
    fn burst_interval_handles_inverted_range() {
        let burst = BurstConfig {
            min_interval_sec: 0.3,
            max_interval_sec: 0.1,
            ..BurstConfig::default()
        };
        let mut rng = SeededRandom::new(4);
        assert!((burst_interval(&burst, &mut rng) - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn burst_probability_floors_interval() {
        let burst = BurstConfig {
            chance_per_sec: 1.0,
            ..BurstConfig::default()
        };
        assert!((burst_start_probability(&burst, 0.0) - MIN_DECISION_GAP).abs() < f64::EPSILON);
        assert!((burst_start_probability(&burst, 10.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn certain_burst_draws_length_in_range() {
        let burst = BurstConfig {
            chance_per_sec: 100.0,
            min_events: 2,
            max_events: 4,
            ..BurstConfig::default()
        };
        let mut rng = SeededRandom::new(5);
        for _ in 0..200 {
            let len = roll_burst(&burst, 1.0, &mut rng).expect("p = 1");
            assert!((2..=4).contains(&len));
        }
    }

    #[test]
    fn zero_length_burst_does_not_start() {
        let burst = BurstConfig {
            chance_per_sec: 100.0,
            min_events: 0,
            max_events: 0,
            ..BurstConfig::default()
        };
        let mut rng = SeededRandom::new(6);
        assert_eq!(roll_burst(&burst, 1.0, &mut rng), None);
    }
}
