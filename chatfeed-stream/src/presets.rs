//! Mood presets: tuned rule profiles for common broadcast moods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chatfeed_core::error::ChatFeedError;
use chatfeed_core::RuleProfile;

// ---------------------------------------------------------------------------
// Feed Moods
// ---------------------------------------------------------------------------

/// How busy the simulated audience is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMood {
    /// Small late-night stream. Slow chat, rare bursts.
    Quiet,
    /// Mid-sized stream. The stock profile.
    #[default]
    Standard,
    /// Big event. Fast chat, frequent emote walls.
    Hype,
}

impl FeedMood {
    /// All moods, quietest first.
    pub const ALL: [Self; 3] = [Self::Quiet, Self::Standard, Self::Hype];

    /// Get a human-readable description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Quiet => "Quiet: a handful of regulars, slow chat",
            Self::Standard => "Standard: steady chatter with the odd burst",
            Self::Hype => "Hype: fast chat, frequent bursts and emote walls",
        }
    }

    /// Lower-case name accepted by [`FeedMood::from_str`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Standard => "standard",
            Self::Hype => "hype",
        }
    }

    /// Rule profile tuned for this mood.
    #[must_use]
    pub fn profile(self) -> RuleProfile {
        let mut profile = RuleProfile::default();

        match self {
            Self::Quiet => {
                profile.rate.base_rate_per_sec = 0.35;
                profile.rate.jitter = 0.5;
                profile.rate.min_interval_sec = 0.8;
                profile.rate.max_interval_sec = 9.0;
                profile.burst.chance_per_sec = 0.01;
                profile.burst.min_events = 2;
                profile.burst.max_events = 4;
                profile.hygiene.max_donate_rate_hz = 0.05;
                profile.signals.decay_per_sec = 0.2;
                profile.selection.weights.insert("emote".to_string(), 1.0);
            }
            Self::Standard => {}
            Self::Hype => {
                profile.rate.base_rate_per_sec = 4.0;
                profile.rate.jitter = 0.3;
                profile.rate.min_interval_sec = 0.05;
                profile.rate.max_interval_sec = 1.0;
                profile.burst.chance_per_sec = 0.15;
                profile.burst.min_events = 6;
                profile.burst.max_events = 18;
                profile.burst.min_interval_sec = 0.03;
                profile.burst.max_interval_sec = 0.12;
                profile.hygiene.max_donate_rate_hz = 0.5;
                profile.selection.max_same_kind_streak = 6;
                profile.selection.weights.insert("emote".to_string(), 6.0);
                profile.selection.weights.insert("donation".to_string(), 1.5);
                profile.signals.decay_per_sec = 0.5;
            }
        }

        profile
    }
}

impl fmt::Display for FeedMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeedMood {
    type Err = ChatFeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "chill" => Ok(Self::Quiet),
            "standard" | "default" | "normal" => Ok(Self::Standard),
            "hype" | "event" => Ok(Self::Hype),
            other => Err(ChatFeedError::Config(format!("unknown feed mood: {other}"))),
        }
    }
}
