//! Broadcast session: one engine, its profile and its content, driven by
//! the host's frame loop and broadcast events.
//!
//! ```text
//!  BroadcastEvent ──notify──▶ signals ──▶ ChatEngine ◀── tick(dt)
//!                                             │
//!                                  TableSampler (content)
//!                                             │
//!                                             ▼
//!                                       Vec<ChatEvent>
//! ```

use tracing::{debug, info};

use chatfeed_core::error::Result;
use chatfeed_core::metrics::EngineStats;
use chatfeed_core::sampler::PayloadSampler;
use chatfeed_core::{ChatEngine, ChatEvent, RuleProfile, SeededRandom};

use crate::config::SessionConfig;
use crate::content::TableSampler;
use crate::events::BroadcastEvent;
use crate::presets::FeedMood;

/// A running chat feed for one broadcast.
#[derive(Debug)]
pub struct BroadcastSession<S: PayloadSampler = TableSampler> {
    engine: ChatEngine,
    profile: RuleProfile,
    sampler: S,
    big_donation_threshold: u64,
}

impl BroadcastSession<TableSampler> {
    /// Build a session from a [`SessionConfig`].
    ///
    /// # Errors
    /// Returns any profile or content load or validation error.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let profile = config.resolve_profile()?;
        let sampler = TableSampler::new(config.resolve_content()?, &profile)?;
        let mut session = Self::new(profile, sampler, config.seed)?;
        session.big_donation_threshold = config.big_donation_threshold;
        Ok(session)
    }

    /// Session with a mood preset and the built-in content.
    ///
    /// # Errors
    /// Only fails if the preset or built-in table are inconsistent.
    pub fn with_mood(mood: FeedMood, seed: Option<u64>) -> Result<Self> {
        Self::from_config(&SessionConfig {
            seed,
            mood,
            ..SessionConfig::default()
        })
    }
}

impl<S: PayloadSampler> BroadcastSession<S> {
    /// Start a session. `seed` of `None` draws from entropy.
    ///
    /// # Errors
    /// Returns the validation error of `profile`.
    pub fn new(profile: RuleProfile, sampler: S, seed: Option<u64>) -> Result<Self> {
        profile.validate()?;
        let rng = seed.map_or_else(SeededRandom::from_entropy, SeededRandom::new);
        let engine = ChatEngine::new(&profile, rng);
        info!(?seed, kinds = profile.kinds.len(), "Broadcast session started");
        Ok(Self {
            engine,
            profile,
            sampler,
            big_donation_threshold: 1000,
        })
    }

    /// Feed a broadcast event to the chat.
    pub fn notify(&mut self, event: &BroadcastEvent) {
        let signals = event.signals(self.big_donation_threshold);
        debug!(event = event.label(), signals = signals.len(), "Broadcast event");
        for signal in signals {
            self.engine.push_signal(&self.profile, signal);
        }
    }

    /// Advance the feed by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> Vec<ChatEvent> {
        self.engine.tick(&self.profile, dt, &mut self.sampler)
    }

    /// Advance the feed by `dt` seconds, appending to `out`.
    pub fn tick_into(&mut self, dt: f64, out: &mut Vec<ChatEvent>) -> usize {
        self.engine.tick_into(&self.profile, dt, &mut self.sampler, out)
    }

    /// Swap the rule profile mid-broadcast.
    ///
    /// A different kind catalog or no-repeat window resets the feed on the
    /// next tick. Samplers bound to the old catalog should be replaced with
    /// [`BroadcastSession::replace_sampler`].
    ///
    /// # Errors
    /// Returns the validation error of `profile`; the old profile stays.
    pub fn replace_profile(&mut self, profile: RuleProfile) -> Result<()> {
        profile.validate()?;
        let reshaped = profile.kinds != self.profile.kinds
            || profile.hygiene.no_repeat_window != self.profile.hygiene.no_repeat_window;
        info!(reshaped, "Rule profile replaced");
        self.profile = profile;
        Ok(())
    }

    /// Swap the content sampler.
    pub fn replace_sampler(&mut self, sampler: S) {
        self.sampler = sampler;
    }

    /// Change the big-donation threshold.
    pub fn set_big_donation_threshold(&mut self, amount: u64) {
        self.big_donation_threshold = amount;
    }

    /// Current rule profile.
    #[must_use]
    pub fn profile(&self) -> &RuleProfile {
        &self.profile
    }

    /// Engine counters.
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        self.engine.stats()
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &ChatEngine {
        &self.engine
    }

    /// Seconds of simulated broadcast time elapsed.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.engine.state().now()
    }
}
