//! Property-Based Tests for the Chat Feed Engine
//!
//! Uses `proptest` to check scheduling and hygiene invariants under random
//! profiles, seeds and frame-time sequences.

use std::collections::VecDeque;

use proptest::prelude::*;

use chatfeed_core::config::{BurstConfig, RateConfig};
use chatfeed_core::ring::RecentIdRing;
use chatfeed_core::sampler::from_fn;
use chatfeed_core::schedule;
use chatfeed_core::{
    ChatEngine, ChatEvent, EventPayload, RandomSource, RuleProfile, RuntimeState, SeededRandom,
    KindId, MAX_DECISIONS_PER_TICK,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_rate() -> impl Strategy<Value = RateConfig> {
    (
        -1.0..50.0f64, // base rate, including degenerate values
        arb_jitter(),
        0.0..2.0f64, // min interval
        0.0..5.0f64, // max interval (may be below min)
    )
        .prop_map(|(base, jitter, min, max)| RateConfig {
            base_rate_per_sec: base,
            jitter,
            min_interval_sec: min,
            max_interval_sec: max,
        })
}

/// Ordinary jitter most of the time, occasionally absurd values whose
/// `[-jitter, jitter)` span overflows `f64`.
fn arb_jitter() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => 0.0..1.5f64,
        1 => 1.5..1e300f64,
        1 => 1e300..f64::MAX,
    ]
}

fn arb_dts() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..0.25f64, 50..400)
}

fn drive(profile: &RuleProfile, seed: u64, dts: &[f64]) -> Vec<ChatEvent> {
    let mut engine = ChatEngine::seeded(profile, seed);
    let mut sampler = from_fn(|kind: KindId, _state: &RuntimeState, rng: &mut dyn RandomSource| {
        let id = (kind.index() as u64 + 1) * 1000 + rng.range_int(1, 500) as u64;
        Some(EventPayload::with_id(id))
    });
    let mut events = Vec::new();
    for dt in dts {
        engine.tick_into(profile, *dt, &mut sampler, &mut events);
    }
    events
}

// ---------------------------------------------------------------------------
// Property: normal intervals stay inside [min, max]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn normal_interval_is_clamped(rate in arb_rate(), seed in any::<u64>()) {
        let mut rng = SeededRandom::new(seed);
        let lo = rate.min_interval_sec.max(0.0);
        let hi = rate.max_interval_sec.max(lo);
        for _ in 0..50 {
            let gap = schedule::normal_interval(&rate, &mut rng);
            prop_assert!(gap >= lo && gap <= hi, "gap {} outside [{}, {}]", gap, lo, hi);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: burst intervals stay inside [a, max(a, b)]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn burst_interval_is_bounded(a in 0.0..1.0f64, b in 0.0..1.0f64, seed in any::<u64>()) {
        let burst = BurstConfig {
            min_interval_sec: a,
            max_interval_sec: b,
            ..BurstConfig::default()
        };
        let mut rng = SeededRandom::new(seed);
        for _ in 0..50 {
            let gap = schedule::burst_interval(&burst, &mut rng);
            prop_assert!(gap >= a && gap <= a.max(b));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: the streak cap holds for any seed and cap
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn streak_cap_holds(
        seed in any::<u64>(),
        cap in 1u32..4,
        bias in 0.2..4.0f64,
        dts in arb_dts(),
    ) {
        let mut profile = RuleProfile::default();
        profile.selection.max_same_kind_streak = cap;
        profile.selection.streak_bias = bias;
        let events = drive(&profile, seed, &dts);

        let mut run = 0;
        let mut last = None;
        for event in &events {
            if Some(event.kind) == last { run += 1 } else { run = 1; last = Some(event.kind) }
            prop_assert!(run <= cap);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: cooldowns and the donation gate are respected
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn cooldown_and_donation_gate_hold(
        seed in any::<u64>(),
        cooldown in 0.5..5.0f64,
        hz in 0.1..2.0f64,
        dts in arb_dts(),
    ) {
        let mut profile = RuleProfile::default();
        profile.selection.cooldowns.insert("emote".to_string(), cooldown);
        profile.selection.weights.insert("donation".to_string(), 20.0);
        profile.hygiene.max_donate_rate_hz = hz;
        let events = drive(&profile, seed, &dts);

        let gaps = |name: &str| -> Vec<f64> {
            let times: Vec<f64> = events
                .iter()
                .filter(|e| e.kind_name == name)
                .map(|e| e.at)
                .collect();
            times.windows(2).map(|w| w[1] - w[0]).collect()
        };
        for gap in gaps("emote") {
            prop_assert!(gap >= cooldown - 1e-9);
        }
        for gap in gaps("donation") {
            prop_assert!(gap >= 1.0 / hz - 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: the ring buffer behaves as a sliding window
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ring_matches_sliding_window(
        capacity in 0usize..8,
        pushes in prop::collection::vec(1u64..20, 0..60),
        needle in 1u64..20,
    ) {
        let mut ring = RecentIdRing::new(capacity);
        let mut model: VecDeque<u64> = VecDeque::new();
        for id in pushes {
            ring.push(id);
            if capacity > 0 {
                if model.len() == capacity {
                    model.pop_front();
                }
                model.push_back(id);
            }
            prop_assert!(ring.len() <= capacity);
            prop_assert_eq!(ring.contains(needle), model.contains(&needle));
        }
    }

    #[test]
    fn ring_resize_keeps_newest(
        capacity in 1usize..10,
        new_capacity in 0usize..10,
        pushes in prop::collection::vec(1u64..1000, 0..30),
    ) {
        let mut ring = RecentIdRing::new(capacity);
        for id in &pushes {
            ring.push(*id);
        }
        let before: Vec<u64> = ring.iter_newest_first().collect();
        ring.resize(new_capacity);
        let after: Vec<u64> = ring.iter_newest_first().collect();
        let expected: Vec<u64> = before.into_iter().take(new_capacity).collect();
        prop_assert_eq!(after, expected);
    }
}

// ---------------------------------------------------------------------------
// Property: identical inputs replay identically
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn same_inputs_same_feed(seed in any::<u64>(), dts in arb_dts()) {
        let profile = RuleProfile::default();
        prop_assert_eq!(drive(&profile, seed, &dts), drive(&profile, seed, &dts));
    }
}

// ---------------------------------------------------------------------------
// Property: runaway frames never exceed the ceiling
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn runaway_frames_are_absorbed(seed in any::<u64>(), dt in 1_000.0..100_000.0f64) {
        let profile = RuleProfile::default();
        let mut engine = ChatEngine::seeded(&profile, seed);
        let mut sampler = from_fn(|_kind, _state, _rng| Some(EventPayload::default()));
        let events = engine.tick(&profile, dt, &mut sampler);
        prop_assert!(events.len() <= MAX_DECISIONS_PER_TICK as usize);
        prop_assert!(engine.stats().decision_points <= u64::from(MAX_DECISIONS_PER_TICK));
        prop_assert_eq!(engine.state().accumulator(), 0.0);
        prop_assert!(engine.state().time_until_next_emit() >= 0.05);
    }
}

// ---------------------------------------------------------------------------
// Property: extreme rate tuning never breaks the engine
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn extreme_rate_tuning_keeps_ticking(
        rate in arb_rate(),
        seed in any::<u64>(),
        dts in arb_dts(),
    ) {
        let mut profile = RuleProfile::default();
        profile.rate = rate;
        let events = drive(&profile, seed, &dts);
        prop_assert!(events.windows(2).all(|w| w[0].at <= w[1].at));
    }
}

// ---------------------------------------------------------------------------
// Property: accumulator never goes negative
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn accumulator_stays_non_negative(seed in any::<u64>(), dts in arb_dts()) {
        let profile = RuleProfile::default();
        let mut engine = ChatEngine::seeded(&profile, seed);
        let mut sampler = from_fn(|_kind, _state, _rng| Some(EventPayload::default()));
        for dt in dts {
            engine.tick(&profile, dt, &mut sampler);
            prop_assert!(engine.state().accumulator() >= 0.0);
            if engine.state().last_kind().is_some() {
                prop_assert!(engine.state().same_kind_streak() >= 1);
            }
        }
    }
}
