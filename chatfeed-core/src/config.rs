//! Rule profile: the read-only tuning the engine consults every tick.
//!
//! Maps directly to a `[profile]` TOML document. Every field has a serde
//! default, so a partial file only overrides what it names.
//!
//! ```toml
//! kinds = ["crowd", "donation", "host", "system", "player", "emote"]
//!
//! [rate]
//! base_rate_per_sec = 1.2
//! jitter = 0.35
//!
//! [selection.weights]
//! crowd = 10.0
//! donation = 1.0
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ChatFeedError, Result};
use crate::types::{KindCatalog, KindId, SignalKind};

/// Complete rule profile for one chat feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleProfile {
    /// Ordered kind catalog. Order is the selection tie-break order.
    #[serde(default)]
    pub kinds: KindCatalog,
    /// Base pacing.
    #[serde(default)]
    pub rate: RateConfig,
    /// Per-kind weights, cooldowns and streak control.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Burst sub-mode.
    #[serde(default)]
    pub burst: BurstConfig,
    /// Anti-repeat and donation pacing.
    #[serde(default)]
    pub hygiene: HygieneConfig,
    /// Response to external signals.
    #[serde(default)]
    pub signals: SignalsConfig,
}

impl RuleProfile {
    /// Load and validate a profile from a TOML string.
    ///
    /// # Errors
    /// Returns `ChatFeedError::Config` if the TOML is invalid, or the
    /// validation error from [`RuleProfile::validate`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let profile: Self =
            toml::from_str(toml_str).map_err(|e| ChatFeedError::Config(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load and validate a profile from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize the profile back to TOML.
    ///
    /// # Errors
    /// Returns `ChatFeedError::Serialization` if encoding fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ChatFeedError::Serialization(e.to_string()))
    }

    /// Check structural consistency.
    ///
    /// Numeric degeneracy (zero rates, negative weights) is not an error:
    /// the engine clamps it. Only things that point at nothing are rejected.
    ///
    /// # Errors
    /// `Config` for an empty or duplicated catalog, `UnknownKind` for any
    /// table, donation kind or signal target naming a kind not in the catalog.
    pub fn validate(&self) -> Result<()> {
        if self.kinds.is_empty() {
            return Err(ChatFeedError::Config("kind catalog is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for (_, name) in self.kinds.iter() {
            if !seen.insert(name) {
                return Err(ChatFeedError::Config(format!("duplicate kind name: {name}")));
            }
        }

        let tables = [
            &self.selection.weights,
            &self.selection.burst_weights,
            &self.selection.cooldowns,
        ];
        for name in tables.iter().flat_map(|t| t.keys()) {
            self.require_kind(name)?;
        }
        if let Some(name) = &self.hygiene.donation_kind {
            self.require_kind(name)?;
        }
        for signal in SignalKind::ALL {
            for name in &self.signals.response(signal).targets {
                self.require_kind(name)?;
            }
        }
        Ok(())
    }

    fn require_kind(&self, name: &str) -> Result<KindId> {
        self.kinds
            .index_of(name)
            .ok_or_else(|| ChatFeedError::UnknownKind(name.to_string()))
    }

    /// Configured base weight of `kind`.
    ///
    /// While bursting the burst table wins if it has any entries. Kinds
    /// missing from the active table weigh `1.0`.
    #[must_use]
    pub fn weight_for(&self, kind: KindId, bursting: bool) -> f64 {
        let table = if bursting && !self.selection.burst_weights.is_empty() {
            &self.selection.burst_weights
        } else {
            &self.selection.weights
        };
        self.kinds
            .name(kind)
            .and_then(|name| table.get(name))
            .copied()
            .unwrap_or(1.0)
    }

    /// Cooldown of `kind` in seconds. Zero means none.
    #[must_use]
    pub fn cooldown_for(&self, kind: KindId) -> f64 {
        self.kinds
            .name(kind)
            .and_then(|name| self.selection.cooldowns.get(name))
            .copied()
            .unwrap_or(0.0)
    }

    /// The kind subject to donation rate limiting, if configured and present.
    #[must_use]
    pub fn donation_kind(&self) -> Option<KindId> {
        self.hygiene
            .donation_kind
            .as_deref()
            .and_then(|name| self.kinds.index_of(name))
    }

    /// Whether `signal` biases `kind`.
    #[must_use]
    pub fn signal_targets(&self, signal: SignalKind, kind: KindId) -> bool {
        self.kinds.name(kind).is_some_and(|name| {
            self.signals
                .response(signal)
                .targets
                .iter()
                .any(|t| t == name)
        })
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Base event pacing outside of bursts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// Mean events per second.
    #[serde(default = "default_base_rate")]
    pub base_rate_per_sec: f64,
    /// Relative rate jitter; `0.35` means ±35 %.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
    /// Shortest allowed gap between decisions, seconds.
    #[serde(default = "default_min_interval")]
    pub min_interval_sec: f64,
    /// Longest allowed gap between decisions, seconds.
    #[serde(default = "default_max_interval")]
    pub max_interval_sec: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            base_rate_per_sec: 1.2,
            jitter: 0.35,
            min_interval_sec: 0.15,
            max_interval_sec: 3.0,
        }
    }
}

/// Weighted selection tables and repetition control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Most consecutive picks of one kind. `0` disables the cap.
    #[serde(default = "default_max_streak")]
    pub max_same_kind_streak: u32,
    /// Multiplier per consecutive repeat: `< 1` suppresses, `> 1` reinforces.
    #[serde(default = "default_streak_bias")]
    pub streak_bias: f64,
    /// Per-kind weights outside bursts.
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,
    /// Per-kind weights during bursts. Empty means "use `weights`".
    #[serde(default = "default_burst_weights")]
    pub burst_weights: BTreeMap<String, f64>,
    /// Per-kind cooldown in seconds.
    #[serde(default = "default_cooldowns")]
    pub cooldowns: BTreeMap<String, f64>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_same_kind_streak: 4,
            streak_bias: 0.75,
            weights: default_weights(),
            burst_weights: default_burst_weights(),
            cooldowns: default_cooldowns(),
        }
    }
}

/// Burst sub-mode tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstConfig {
    /// Probability per second of entering a burst at a decision point.
    #[serde(default = "default_burst_chance")]
    pub chance_per_sec: f64,
    /// Fewest events in a burst (inclusive).
    #[serde(default = "default_burst_min_events")]
    pub min_events: u32,
    /// Most events in a burst (inclusive).
    #[serde(default = "default_burst_max_events")]
    pub max_events: u32,
    /// Shortest gap between burst events, seconds.
    #[serde(default = "default_burst_min_interval")]
    pub min_interval_sec: f64,
    /// Longest gap between burst events, seconds.
    #[serde(default = "default_burst_max_interval")]
    pub max_interval_sec: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            chance_per_sec: 0.04,
            min_events: 4,
            max_events: 10,
            min_interval_sec: 0.06,
            max_interval_sec: 0.22,
        }
    }
}

/// Repetition hygiene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HygieneConfig {
    /// How many recent content ids must not be reused. `0` disables.
    #[serde(default = "default_no_repeat_window")]
    pub no_repeat_window: usize,
    /// Highest donation emission frequency. `0` disables the gate.
    #[serde(default = "default_max_donate_rate")]
    pub max_donate_rate_hz: f64,
    /// Kind the donation gate applies to.
    #[serde(default = "default_donation_kind")]
    pub donation_kind: Option<String>,
}

impl Default for HygieneConfig {
    fn default() -> Self {
        Self {
            no_repeat_window: 24,
            max_donate_rate_hz: 0.2,
            donation_kind: default_donation_kind(),
        }
    }
}

impl HygieneConfig {
    /// Minimum seconds between two donations, if gated.
    #[must_use]
    pub fn min_donation_interval(&self) -> Option<f64> {
        (self.max_donate_rate_hz > 0.0).then(|| 1.0 / self.max_donate_rate_hz)
    }
}

/// How one signal biases selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResponse {
    /// Weight multiplier at full boost.
    #[serde(default = "default_signal_multiplier")]
    pub multiplier: f64,
    /// Kinds the multiplier applies to.
    #[serde(default)]
    pub targets: Vec<String>,
}

impl SignalResponse {
    fn new(multiplier: f64, targets: &[&str]) -> Self {
        Self {
            multiplier,
            targets: targets.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// Signal response table with shared hold and decay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    /// Seconds a pushed signal is considered held.
    #[serde(default = "default_hold")]
    pub hold_sec: f64,
    /// Linear boost decay per second.
    #[serde(default = "default_decay")]
    pub decay_per_sec: f64,
    /// Response to the host speaking.
    #[serde(default = "default_host_spoke")]
    pub host_spoke: SignalResponse,
    /// Response to a donation.
    #[serde(default = "default_donation_signal")]
    pub donation: SignalResponse,
    /// Response to a large donation.
    #[serde(default = "default_big_donation_signal")]
    pub big_donation: SignalResponse,
    /// Response to a system notice.
    #[serde(default = "default_system_notice")]
    pub system_notice: SignalResponse,
    /// Response to a player message.
    #[serde(default = "default_player_message")]
    pub player_message: SignalResponse,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            hold_sec: 2.0,
            decay_per_sec: 0.35,
            host_spoke: default_host_spoke(),
            donation: default_donation_signal(),
            big_donation: default_big_donation_signal(),
            system_notice: default_system_notice(),
            player_message: default_player_message(),
        }
    }
}

impl SignalsConfig {
    /// Response entry for `signal`.
    #[must_use]
    pub fn response(&self, signal: SignalKind) -> &SignalResponse {
        match signal {
            SignalKind::HostSpoke => &self.host_spoke,
            SignalKind::Donation => &self.donation,
            SignalKind::BigDonation => &self.big_donation,
            SignalKind::SystemNotice => &self.system_notice,
            SignalKind::PlayerMessage => &self.player_message,
        }
    }

    /// Mutable response entry for `signal`.
    pub fn response_mut(&mut self, signal: SignalKind) -> &mut SignalResponse {
        match signal {
            SignalKind::HostSpoke => &mut self.host_spoke,
            SignalKind::Donation => &mut self.donation,
            SignalKind::BigDonation => &mut self.big_donation,
            SignalKind::SystemNotice => &mut self.system_notice,
            SignalKind::PlayerMessage => &mut self.player_message,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn default_weights() -> BTreeMap<String, f64> {
    table(&[
        ("crowd", 10.0),
        ("donation", 0.8),
        ("host", 0.6),
        ("system", 0.3),
        ("player", 0.0),
        ("emote", 3.0),
    ])
}
fn default_burst_weights() -> BTreeMap<String, f64> {
    table(&[("crowd", 6.0), ("emote", 8.0), ("donation", 0.4)])
}
fn default_cooldowns() -> BTreeMap<String, f64> {
    table(&[("host", 8.0), ("system", 20.0)])
}
fn default_host_spoke() -> SignalResponse { SignalResponse::new(2.5, &["crowd", "emote"]) }
fn default_donation_signal() -> SignalResponse { SignalResponse::new(2.0, &["donation"]) }
fn default_big_donation_signal() -> SignalResponse {
    SignalResponse::new(3.0, &["donation", "emote"])
}
fn default_system_notice() -> SignalResponse { SignalResponse::new(1.5, &["crowd"]) }
fn default_player_message() -> SignalResponse { SignalResponse::new(2.0, &["crowd", "emote"]) }
fn default_donation_kind() -> Option<String> { Some("donation".to_string()) }
fn default_base_rate() -> f64 { 1.2 }
fn default_jitter() -> f64 { 0.35 }
fn default_min_interval() -> f64 { 0.15 }
fn default_max_interval() -> f64 { 3.0 }
fn default_max_streak() -> u32 { 4 }
fn default_streak_bias() -> f64 { 0.75 }
fn default_burst_chance() -> f64 { 0.04 }
fn default_burst_min_events() -> u32 { 4 }
fn default_burst_max_events() -> u32 { 10 }
fn default_burst_min_interval() -> f64 { 0.06 }
fn default_burst_max_interval() -> f64 { 0.22 }
fn default_no_repeat_window() -> usize { 24 }
fn default_max_donate_rate() -> f64 { 0.2 }
fn default_signal_multiplier() -> f64 { 1.0 }
fn default_hold() -> f64 { 2.0 }
fn default_decay() -> f64 { 0.35 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_validates() {
        RuleProfile::default().validate().expect("defaults are consistent");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let profile = RuleProfile::from_toml(
            r#"
            [rate]
            base_rate_per_sec = 4.0

            [hygiene]
            no_repeat_window = 3
            "#,
        )
        .expect("valid toml");
        assert!((profile.rate.base_rate_per_sec - 4.0).abs() < f64::EPSILON);
        assert!((profile.rate.jitter - 0.35).abs() < f64::EPSILON);
        assert_eq!(profile.hygiene.no_repeat_window, 3);
        assert_eq!(profile.kinds.len(), 6);
    }

    #[test]
    fn unknown_weight_key_is_rejected() {
        let err = RuleProfile::from_toml(
            r#"
            kinds = ["crowd"]
            [selection]
            weights = { crowd = 1.0, ghost = 2.0 }
            burst_weights = {}
            cooldowns = {}
            [hygiene]
            donation_kind = "crowd"
            [signals]
            host_spoke = { multiplier = 1.0 }
            donation = { multiplier = 1.0 }
            big_donation = { multiplier = 1.0 }
            system_notice = { multiplier = 1.0 }
            player_message = { multiplier = 1.0 }
            "#,
        )
        .expect_err("ghost is not a kind");
        assert!(matches!(err, ChatFeedError::UnknownKind(ref k) if k == "ghost"));
    }

    #[test]
    fn duplicate_kinds_are_rejected() {
        let mut profile = RuleProfile::default();
        profile.kinds = KindCatalog::new(["crowd", "crowd"]);
        profile.selection.weights.clear();
        profile.selection.burst_weights.clear();
        profile.selection.cooldowns.clear();
        profile.hygiene.donation_kind = None;
        for signal in SignalKind::ALL {
            profile.signals.response_mut(signal).targets.clear();
        }
        assert!(matches!(profile.validate(), Err(ChatFeedError::Config(_))));
    }

    #[test]
    fn missing_weight_defaults_to_one() {
        let mut profile = RuleProfile::default();
        profile.selection.weights.remove("host");
        let host = profile.kinds.index_of("host").expect("host kind");
        assert!((profile.weight_for(host, false) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn burst_table_only_when_bursting_and_non_empty() {
        let mut profile = RuleProfile::default();
        let crowd = profile.kinds.index_of("crowd").expect("crowd kind");
        assert!((profile.weight_for(crowd, false) - 10.0).abs() < f64::EPSILON);
        assert!((profile.weight_for(crowd, true) - 6.0).abs() < f64::EPSILON);

        profile.selection.burst_weights.clear();
        assert!((profile.weight_for(crowd, true) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn donation_gate_interval() {
        let mut hygiene = HygieneConfig::default();
        hygiene.max_donate_rate_hz = 0.5;
        assert_eq!(hygiene.min_donation_interval(), Some(2.0));
        hygiene.max_donate_rate_hz = 0.0;
        assert_eq!(hygiene.min_donation_interval(), None);
    }

    #[test]
    fn toml_round_trip_preserves_tables() {
        let profile = RuleProfile::default();
        let text = profile.to_toml().expect("serializable");
        let back = RuleProfile::from_toml(&text).expect("parses back");
        assert_eq!(back.selection.weights, profile.selection.weights);
        assert_eq!(back.kinds, profile.kinds);
    }

    #[test]
    fn signal_targets_resolve_by_name() {
        let profile = RuleProfile::default();
        let donation = profile.kinds.index_of("donation").expect("donation kind");
        let crowd = profile.kinds.index_of("crowd").expect("crowd kind");
        assert!(profile.signal_targets(SignalKind::Donation, donation));
        assert!(profile.signal_targets(SignalKind::BigDonation, donation));
        assert!(!profile.signal_targets(SignalKind::Donation, crowd));
    }

    #[test]
    fn profile_loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "[burst]\nchance_per_sec = 0.5\n").expect("write profile");

        let profile = RuleProfile::from_file(&path).expect("loads");
        assert!((profile.burst.chance_per_sec - 0.5).abs() < f64::EPSILON);
        assert!(matches!(
            RuleProfile::from_file(&dir.path().join("missing.toml")),
            Err(ChatFeedError::Io(_))
        ));
    }
}
