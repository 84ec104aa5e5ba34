//! The scheduler/selector engine.
//!
//! `tick(dt)` is a pure state transition driven by the host's frame loop:
//!
//! ```text
//!   decay boosts ─▶ now += dt, acc += dt ─▶ while acc ≥ next_gap (≤ 128×):
//!                                              acc -= next_gap
//!                                              Normal? roll burst ─▶ start: burst gap, continue
//!                                              select kind ─▶ sample ─▶ record + emit
//!                                              next_gap = burst gap | normal gap
//! ```
//!
//! ## State machine
//!
//! ```text
//!            roll succeeds (len > 0)
//!   Normal ─────────────────────────▶ Bursting { remaining }
//!     ▲                                   │ each decision: remaining -= 1
//!     └────────── remaining == 0 ─────────┘
//! ```
//!
//! A pathological `dt` (resume after a pause) is absorbed by the iteration
//! ceiling: pending time is dropped instead of replayed as a flood.

use tracing::{debug, info, trace, warn};

use crate::config::RuleProfile;
use crate::metrics::EngineStats;
use crate::random::{RandomSource, SeededRandom};
use crate::runtime::{BurstPhase, RuntimeState};
use crate::sampler::PayloadSampler;
use crate::schedule::{self, MIN_DECISION_GAP};
use crate::selection;
use crate::types::{ChatEvent, SignalKind};

/// Most decision points processed in one `tick` call.
pub const MAX_DECISIONS_PER_TICK: u32 = 128;

/// One chat feed: runtime state, its random source and counters.
///
/// The engine is single-owner and synchronous. Run one engine per feed;
/// share nothing between them.
#[derive(Debug, Clone)]
pub struct ChatEngine<R: RandomSource = SeededRandom> {
    state: RuntimeState,
    rng: R,
    stats: EngineStats,
    next_seq: u64,
}

impl ChatEngine<SeededRandom> {
    /// Engine with a reproducible [`SeededRandom`].
    #[must_use]
    pub fn seeded(profile: &RuleProfile, seed: u64) -> Self {
        Self::new(profile, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> ChatEngine<R> {
    /// Build an engine shaped for `profile` and schedule its first decision.
    pub fn new(profile: &RuleProfile, rng: R) -> Self {
        let kind_count = profile.kinds.len();
        let window = profile.hygiene.no_repeat_window;
        let mut engine = Self {
            state: RuntimeState::new(kind_count, window),
            rng,
            stats: EngineStats::new(kind_count),
            next_seq: 0,
        };
        engine.state.time_until_next_emit =
            schedule::normal_interval(&profile.rate, &mut engine.rng);
        info!(
            kinds = kind_count,
            no_repeat_window = window,
            first_gap = engine.state.time_until_next_emit,
            "Chat engine created"
        );
        engine
    }

    /// Read-only view of the runtime state.
    #[must_use]
    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    /// Counters since construction.
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Zero the counters without touching the simulation.
    pub fn reset_stats(&mut self) {
        self.stats.clear();
    }

    /// The engine's random source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Reinitialise state for `profile` and schedule a fresh decision point.
    ///
    /// Counters survive; only the simulation state is rebuilt.
    pub fn reset(&mut self, profile: &RuleProfile) {
        let kind_count = profile.kinds.len();
        let window = profile.hygiene.no_repeat_window;
        self.state.reset(kind_count, window);
        self.state.time_until_next_emit = schedule::normal_interval(&profile.rate, &mut self.rng);
        self.stats.resize_kinds(kind_count);
        self.stats.resets += 1;
        info!(kinds = kind_count, no_repeat_window = window, "Chat engine state reset");
    }

    /// Notify the engine of an external event.
    ///
    /// The boost takes effect immediately, including for
    /// [`ChatEngine::effective_weights`] before the next tick.
    pub fn push_signal(&mut self, profile: &RuleProfile, signal: SignalKind) {
        self.state
            .boosts
            .push(signal, self.state.now, profile.signals.hold_sec);
        self.stats.signals_pushed += 1;
        debug!(%signal, now = self.state.now, "Signal pushed");
    }

    /// Current effective selection weight of every kind, in catalog order.
    #[must_use]
    pub fn effective_weights(&self, profile: &RuleProfile) -> Vec<f64> {
        selection::effective_weights(profile, &self.state)
    }

    /// Advance the feed by `dt` seconds and return the events emitted.
    pub fn tick<S>(&mut self, profile: &RuleProfile, dt: f64, sampler: &mut S) -> Vec<ChatEvent>
    where
        S: PayloadSampler + ?Sized,
    {
        let mut out = Vec::new();
        self.tick_into(profile, dt, sampler, &mut out);
        out
    }

    /// Advance the feed by `dt` seconds, appending emitted events to `out`.
    ///
    /// Returns the number of events appended. Negative or non-finite `dt`
    /// is treated as zero.
    pub fn tick_into<S>(
        &mut self,
        profile: &RuleProfile,
        dt: f64,
        sampler: &mut S,
        out: &mut Vec<ChatEvent>,
    ) -> usize
    where
        S: PayloadSampler + ?Sized,
    {
        let kind_count = profile.kinds.len();
        let window = profile.hygiene.no_repeat_window;
        if !self.state.matches_shape(kind_count, window) {
            warn!(
                old_kinds = self.state.kind_count(),
                new_kinds = kind_count,
                old_window = self.state.recent.capacity(),
                new_window = window,
                "Profile shape changed, resetting chat engine state"
            );
            self.reset(profile);
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let before = out.len();
        self.stats.ticks += 1;

        self.state.boosts.decay(dt, profile.signals.decay_per_sec);
        self.state.now += dt;
        self.state.accumulator += dt;

        let mut iterations = 0;
        let mut hit_ceiling = false;
        while self.state.accumulator >= self.state.time_until_next_emit {
            if iterations >= MAX_DECISIONS_PER_TICK {
                hit_ceiling = true;
                break;
            }
            iterations += 1;
            self.stats.decision_points += 1;

            let gap = self.state.time_until_next_emit;
            self.state.accumulator -= gap;

            if !self.state.is_bursting() {
                if let Some(remaining) = schedule::roll_burst(&profile.burst, gap, &mut self.rng) {
                    self.state.burst = BurstPhase::Bursting { remaining };
                    self.state.time_until_next_emit =
                        schedule::burst_interval(&profile.burst, &mut self.rng);
                    self.stats.bursts_started += 1;
                    debug!(remaining, now = self.state.now, "Burst started");
                    continue;
                }
            }

            self.decide(profile, sampler, out);
            self.state.time_until_next_emit = self.next_gap(profile);
        }

        if hit_ceiling {
            self.state.accumulator = 0.0;
            self.state.time_until_next_emit = self.state.time_until_next_emit.max(MIN_DECISION_GAP);
            self.stats.ceiling_hits += 1;
            warn!(
                dt,
                ceiling = MAX_DECISIONS_PER_TICK,
                "Tick hit the decision ceiling, dropping pending time"
            );
        }
        // Guard against float drift leaving a tiny negative remainder.
        self.state.accumulator = self.state.accumulator.max(0.0);

        out.len() - before
    }

    /// Select a kind, sample it and record the emission.
    fn decide<S>(&mut self, profile: &RuleProfile, sampler: &mut S, out: &mut Vec<ChatEvent>)
    where
        S: PayloadSampler + ?Sized,
    {
        let Some(kind) = selection::select_kind(profile, &self.state, &mut self.rng) else {
            self.stats.silent_decisions += 1;
            trace!(now = self.state.now, "No kind selectable");
            return;
        };

        let Some(payload) = sampler.try_sample(kind, &self.state, &mut self.rng) else {
            self.stats.sampler_misses += 1;
            debug!(%kind, now = self.state.now, "Sampler had no payload");
            return;
        };

        let is_donation = profile.donation_kind() == Some(kind);
        self.state
            .record_emit(kind, payload.content_id, profile.cooldown_for(kind), is_donation);
        self.stats.record_emit(kind);

        let event = ChatEvent {
            seq: self.next_seq,
            kind,
            kind_name: profile.kinds.name(kind).unwrap_or_default().to_string(),
            at: self.state.now,
            in_burst: self.state.is_bursting(),
            payload,
        };
        self.next_seq += 1;
        trace!(seq = event.seq, kind = %event.kind_name, at = event.at, "Chat event emitted");
        out.push(event);
    }

    /// Advance the burst sub-state after a decision and pick the next gap.
    fn next_gap(&mut self, profile: &RuleProfile) -> f64 {
        match self.state.burst {
            BurstPhase::Bursting { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state.burst = BurstPhase::Normal;
                    self.stats.bursts_completed += 1;
                    debug!(now = self.state.now, "Burst finished");
                    schedule::normal_interval(&profile.rate, &mut self.rng)
                } else {
                    self.state.burst = BurstPhase::Bursting { remaining };
                    schedule::burst_interval(&profile.burst, &mut self.rng)
                }
            }
            BurstPhase::Normal => schedule::normal_interval(&profile.rate, &mut self.rng),
        }
    }
}
