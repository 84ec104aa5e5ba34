//! Mutable per-session engine state.
//!
//! One [`RuntimeState`] belongs to exactly one engine. Samplers get a
//! shared borrow of it during a tick so they can consult the anti-repeat
//! window; nothing outside the engine mutates it.

use crate::ring::RecentIdRing;
use crate::signal::SignalBoosts;
use crate::types::{KindId, SignalKind};

/// Burst sub-state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstPhase {
    /// Regular pacing.
    #[default]
    Normal,
    /// Fast, burst-weighted pacing with `remaining` events left.
    Bursting {
        /// Events still to be emitted before returning to `Normal`.
        remaining: u32,
    },
}

/// Clock, scheduling and hygiene bookkeeping for one feed.
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub(crate) now: f64,
    pub(crate) accumulator: f64,
    pub(crate) time_until_next_emit: f64,
    pub(crate) burst: BurstPhase,
    pub(crate) cooldown_until: Vec<f64>,
    pub(crate) last_kind: Option<KindId>,
    pub(crate) same_kind_streak: u32,
    pub(crate) last_donation_at: f64,
    pub(crate) recent: RecentIdRing,
    pub(crate) boosts: SignalBoosts,
}

impl RuntimeState {
    /// Fresh state for `kind_count` kinds and a no-repeat window of `window`.
    #[must_use]
    pub fn new(kind_count: usize, window: usize) -> Self {
        Self {
            now: 0.0,
            accumulator: 0.0,
            time_until_next_emit: 0.0,
            burst: BurstPhase::Normal,
            cooldown_until: vec![f64::NEG_INFINITY; kind_count],
            last_kind: None,
            same_kind_streak: 0,
            last_donation_at: f64::NEG_INFINITY,
            recent: RecentIdRing::new(window),
            boosts: SignalBoosts::new(),
        }
    }

    /// Reinitialise every field for a new profile shape.
    pub fn reset(&mut self, kind_count: usize, window: usize) {
        *self = Self::new(kind_count, window);
    }

    /// Whether this state was sized for the given shape.
    #[must_use]
    pub fn matches_shape(&self, kind_count: usize, window: usize) -> bool {
        self.cooldown_until.len() == kind_count && self.recent.capacity() == window
    }

    /// Simulation clock, seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Elapsed time not yet consumed by decision points.
    #[must_use]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Currently scheduled gap to the next decision point.
    #[must_use]
    pub fn time_until_next_emit(&self) -> f64 {
        self.time_until_next_emit
    }

    /// Current burst sub-state.
    #[must_use]
    pub fn burst(&self) -> BurstPhase {
        self.burst
    }

    /// Whether a burst is in progress.
    #[must_use]
    pub fn is_bursting(&self) -> bool {
        matches!(self.burst, BurstPhase::Bursting { .. })
    }

    /// Number of kinds this state tracks.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.cooldown_until.len()
    }

    /// Whether `kind` is cooling down right now.
    #[must_use]
    pub fn on_cooldown(&self, kind: KindId) -> bool {
        self.cooldown_until
            .get(kind.index())
            .is_some_and(|until| *until > self.now)
    }

    /// Cooldown expiry of `kind`, if tracked.
    #[must_use]
    pub fn cooldown_until(&self, kind: KindId) -> Option<f64> {
        self.cooldown_until.get(kind.index()).copied()
    }

    /// Most recently emitted kind.
    #[must_use]
    pub fn last_kind(&self) -> Option<KindId> {
        self.last_kind
    }

    /// How many times in a row `last_kind` was emitted.
    #[must_use]
    pub fn same_kind_streak(&self) -> u32 {
        self.same_kind_streak
    }

    /// Clock value of the last donation, `-inf` if none yet.
    #[must_use]
    pub fn last_donation_at(&self) -> f64 {
        self.last_donation_at
    }

    /// Recently emitted content ids.
    #[must_use]
    pub fn recent(&self) -> &RecentIdRing {
        &self.recent
    }

    /// Whether `content_id` is inside the no-repeat window.
    #[must_use]
    pub fn recently_used(&self, content_id: u64) -> bool {
        content_id != 0 && self.recent.contains(content_id)
    }

    /// Signal boost levels.
    #[must_use]
    pub fn boosts(&self) -> &SignalBoosts {
        &self.boosts
    }

    /// Level of one signal boost.
    #[must_use]
    pub fn boost_level(&self, signal: SignalKind) -> f64 {
        self.boosts.level(signal)
    }

    /// Record a successful emission of `kind` carrying `content_id`:
    /// streak, cooldown, donation gate and anti-repeat window.
    pub(crate) fn record_emit(
        &mut self,
        kind: KindId,
        content_id: u64,
        cooldown_sec: f64,
        is_donation: bool,
    ) {
        if self.last_kind == Some(kind) {
            self.same_kind_streak = self.same_kind_streak.saturating_add(1);
        } else {
            self.last_kind = Some(kind);
            self.same_kind_streak = 1;
        }

        if cooldown_sec > 0.0 {
            if let Some(until) = self.cooldown_until.get_mut(kind.index()) {
                *until = self.now + cooldown_sec;
            }
        }

        if is_donation {
            self.last_donation_at = self.now;
        }

        if content_id != 0 && self.recent.is_enabled() {
            self.recent.push(content_id);
        }
    }
}
