//! Weighted kind selection under hygiene constraints.
//!
//! For every kind in catalog order:
//!
//! 1. Start from the configured weight (burst table while bursting).
//! 2. Zero it if the weight is not positive, the kind is cooling down,
//!    it would exceed the same-kind streak cap, or it is the donation kind
//!    and the donation gate is still closed.
//! 3. If it repeats the last kind, scale by `streak_bias ^ streak`.
//! 4. Multiply in every signal boost that targets it.
//!
//! The pick is a cumulative scan over a uniform draw in `[0, total)`: the
//! first kind whose running sum exceeds the draw wins. A draw landing
//! exactly on a boundary therefore belongs to the later kind, and the
//! resolution always follows catalog order.

use crate::config::RuleProfile;
use crate::random::RandomSource;
use crate::runtime::RuntimeState;
use crate::types::{KindId, SignalKind};

/// Effective weight of `kind` right now. Zero means excluded.
#[must_use]
pub fn effective_weight(profile: &RuleProfile, state: &RuntimeState, kind: KindId) -> f64 {
    let base = profile.weight_for(kind, state.is_bursting());
    if !base.is_finite() || base <= 0.0 {
        return 0.0;
    }
    if state.on_cooldown(kind) {
        return 0.0;
    }

    let repeats_last = state.last_kind() == Some(kind);
    let cap = profile.selection.max_same_kind_streak;
    if repeats_last && cap > 0 && state.same_kind_streak() >= cap {
        return 0.0;
    }

    if profile.donation_kind() == Some(kind) {
        if let Some(gap) = profile.hygiene.min_donation_interval() {
            if state.now() - state.last_donation_at() < gap {
                return 0.0;
            }
        }
    }

    let mut weight = base;
    if repeats_last {
        let exponent = i32::try_from(state.same_kind_streak()).unwrap_or(i32::MAX);
        weight *= profile.selection.streak_bias.max(0.0).powi(exponent);
    }

    for signal in SignalKind::ALL {
        if profile.signal_targets(signal, kind) {
            weight *= state.boosts().multiplier(signal, &profile.signals).max(0.0);
        }
    }

    if weight.is_finite() { weight } else { 0.0 }
}

/// Effective weights for the whole catalog, in catalog order.
#[must_use]
pub fn effective_weights(profile: &RuleProfile, state: &RuntimeState) -> Vec<f64> {
    profile
        .kinds
        .iter()
        .map(|(kind, _)| effective_weight(profile, state, kind))
        .collect()
}

/// Cumulative-weight pick for a draw already scaled to `[0, total)`.
///
/// Returns `None` when no weight is positive.
#[must_use]
pub fn pick_by_draw(weights: &[f64], draw: f64) -> Option<KindId> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(KindId(i));
        if cumulative > draw {
            return last_positive;
        }
    }
    // Rounding can leave the draw at the very top of the range.
    last_positive
}

/// Select a kind for the current decision point.
///
/// `None` means nothing is currently selectable; that is a silent no-op.
pub fn select_kind(
    profile: &RuleProfile,
    state: &RuntimeState,
    rng: &mut dyn RandomSource,
) -> Option<KindId> {
    let weights = effective_weights(profile, state);
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    pick_by_draw(&weights, rng.next01() * total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionConfig;
    use crate::types::KindCatalog;
    use std::collections::BTreeMap;

    /// Replays a fixed list of `next01` values.
    struct Scripted(Vec<f64>);

    impl RandomSource for Scripted {
        fn next01(&mut self) -> f64 {
            if self.0.is_empty() { 0.0 } else { self.0.remove(0) }
        }

        fn range_int(&mut self, a: i64, _b_exclusive: i64) -> i64 {
            a
        }
    }

    fn two_kind_profile() -> RuleProfile {
        let mut profile = RuleProfile::default();
        profile.kinds = KindCatalog::new(["crowd", "donation"]);
        profile.selection = SelectionConfig {
            max_same_kind_streak: 2,
            streak_bias: 1.0,
            weights: BTreeMap::from([("crowd".to_string(), 1.0), ("donation".to_string(), 1.0)]),
            burst_weights: BTreeMap::new(),
            cooldowns: BTreeMap::new(),
        };
        profile.hygiene.max_donate_rate_hz = 0.0;
        profile
    }

    #[test]
    fn exact_tie_goes_to_the_next_kind() {
        // cumulative(crowd) == draw exactly: crowd does not "exceed", donation wins.
        assert_eq!(pick_by_draw(&[1.0, 1.0], 1.0), Some(KindId(1)));
        assert_eq!(pick_by_draw(&[1.0, 1.0], 0.999), Some(KindId(0)));
        assert_eq!(pick_by_draw(&[1.0, 1.0], 0.0), Some(KindId(0)));
    }

    #[test]
    fn zero_weights_are_skipped() {
        assert_eq!(pick_by_draw(&[0.0, 2.0, 0.0], 0.0), Some(KindId(1)));
        assert_eq!(pick_by_draw(&[0.0, 0.0], 0.0), None);
        assert_eq!(pick_by_draw(&[1.0, 0.0], 5.0), Some(KindId(0)));
    }

    #[test]
    fn scripted_draw_selects_by_cumulative_scan() {
        let profile = two_kind_profile();
        let state = RuntimeState::new(2, 0);
        let mut rng = Scripted(vec![0.5]);
        // total 2.0, draw 1.0: tie at the crowd boundary resolves to donation.
        assert_eq!(select_kind(&profile, &state, &mut rng), Some(KindId(1)));
    }

    #[test]
    fn streak_cap_excludes_last_kind() {
        let profile = two_kind_profile();
        let mut state = RuntimeState::new(2, 0);
        state.record_emit(KindId(0), 0, 0.0, false);
        state.record_emit(KindId(0), 0, 0.0, false);
        let weights = effective_weights(&profile, &state);
        assert_eq!(weights[0], 0.0);
        assert!(weights[1] > 0.0);
    }

    #[test]
    fn streak_bias_scales_repeats() {
        let mut profile = two_kind_profile();
        profile.selection.streak_bias = 0.5;
        profile.selection.max_same_kind_streak = 0;
        let mut state = RuntimeState::new(2, 0);
        state.record_emit(KindId(0), 0, 0.0, false);
        state.record_emit(KindId(0), 0, 0.0, false);
        let weights = effective_weights(&profile, &state);
        assert!((weights[0] - 0.25).abs() < 1e-12);
        assert!((weights[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cooldown_excludes_kind() {
        let profile = two_kind_profile();
        let mut state = RuntimeState::new(2, 0);
        state.record_emit(KindId(1), 0, 5.0, false);
        state.now = 4.9;
        assert_eq!(effective_weight(&profile, &state, KindId(1)), 0.0);
        state.now = 5.0;
        assert!(effective_weight(&profile, &state, KindId(1)) > 0.0);
    }

    #[test]
    fn donation_gate_closes_after_donation() {
        let mut profile = two_kind_profile();
        profile.hygiene.max_donate_rate_hz = 0.5;
        let mut state = RuntimeState::new(2, 0);
        assert!(effective_weight(&profile, &state, KindId(1)) > 0.0);

        state.record_emit(KindId(1), 0, 0.0, true);
        state.now = 1.9;
        assert_eq!(effective_weight(&profile, &state, KindId(1)), 0.0);
        state.now = 2.0;
        assert!(effective_weight(&profile, &state, KindId(1)) > 0.0);
    }

    #[test]
    fn signals_compound_on_shared_target() {
        let mut profile = two_kind_profile();
        profile.signals.donation.multiplier = 2.0;
        profile.signals.donation.targets = vec!["donation".to_string()];
        profile.signals.big_donation.multiplier = 3.0;
        profile.signals.big_donation.targets = vec!["donation".to_string()];
        let mut state = RuntimeState::new(2, 0);
        state.boosts.push(SignalKind::Donation, 0.0, 1.0);
        state.boosts.push(SignalKind::BigDonation, 0.0, 1.0);
        assert!((effective_weight(&profile, &state, KindId(1)) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn nothing_selectable_is_none() {
        let mut profile = two_kind_profile();
        profile.selection.weights.insert("crowd".to_string(), 0.0);
        profile.selection.weights.insert("donation".to_string(), -1.0);
        let state = RuntimeState::new(2, 0);
        let mut rng = Scripted(vec![0.3]);
        assert_eq!(select_kind(&profile, &state, &mut rng), None);
    }
}
