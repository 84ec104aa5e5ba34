//! Core type definitions for the chat feed engine.
//!
//! Kinds are not a compiled-in enum: the host supplies an ordered catalog
//! of kind names and the engine addresses them by position.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Position of an event kind inside a [`KindCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KindId(pub usize);

impl KindId {
    /// Raw index into per-kind arrays.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed, ordered list of event kind names.
///
/// Enumeration order matters: it is the tie-break order of weighted
/// selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindCatalog(Vec<String>);

impl KindCatalog {
    /// Build a catalog from kind names in enumeration order.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Number of kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the catalog has no kinds at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look a kind up by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<KindId> {
        self.0.iter().position(|n| n == name).map(KindId)
    }

    /// Name of the kind at `id`, if it exists.
    #[must_use]
    pub fn name(&self, id: KindId) -> Option<&str> {
        self.0.get(id.0).map(String::as_str)
    }

    /// Iterate `(id, name)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (KindId, &str)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, n)| (KindId(i), n.as_str()))
    }
}

impl Default for KindCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_KINDS)
    }
}

/// Kind names used by the default catalog.
pub const DEFAULT_KINDS: [&str; 6] = ["crowd", "donation", "host", "system", "player", "emote"];

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// External notifications that temporarily bias kind selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// The host said something on stream.
    HostSpoke,
    /// A donation landed.
    Donation,
    /// A donation above the "big" threshold landed.
    BigDonation,
    /// A system notice was shown.
    SystemNotice,
    /// The player sent a message into chat.
    PlayerMessage,
}

impl SignalKind {
    /// Number of signal kinds.
    pub const COUNT: usize = 5;

    /// All signal kinds in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::HostSpoke,
        Self::Donation,
        Self::BigDonation,
        Self::SystemNotice,
        Self::PlayerMessage,
    ];

    /// Stable index into per-signal arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::HostSpoke => 0,
            Self::Donation => 1,
            Self::BigDonation => 2,
            Self::SystemNotice => 3,
            Self::PlayerMessage => 4,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostSpoke => write!(f, "host_spoke"),
            Self::Donation => write!(f, "donation"),
            Self::BigDonation => write!(f, "big_donation"),
            Self::SystemNotice => write!(f, "system_notice"),
            Self::PlayerMessage => write!(f, "player_message"),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Concrete content for one chat event, produced by a payload sampler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Content identifier used for no-repeat tracking. `0` means untracked.
    pub content_id: u64,
    /// Display name of whoever "sent" the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Donation amount, for donation-like kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Emote identifier, for emote-only kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emote: Option<String>,
}

impl EventPayload {
    /// A payload carrying only a content id.
    #[must_use]
    pub fn with_id(content_id: u64) -> Self {
        Self {
            content_id,
            ..Self::default()
        }
    }
}

/// One emitted chat event, as handed to the output consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// Monotonic sequence number within one engine instance.
    pub seq: u64,
    /// Kind that was selected.
    pub kind: KindId,
    /// Catalog name of the kind.
    pub kind_name: String,
    /// Simulation clock at emission, in seconds.
    pub at: f64,
    /// Whether the event was emitted during a burst.
    pub in_burst: bool,
    /// Sampled content.
    pub payload: EventPayload,
}

impl fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>8.3}s] {:<9}", self.at, self.kind_name)?;
        if let Some(author) = &self.payload.author {
            write!(f, " {author}:")?;
        }
        if let Some(amount) = self.payload.amount {
            write!(f, " ({amount})")?;
        }
        if let Some(text) = &self.payload.text {
            write!(f, " {text}")?;
        }
        if let Some(emote) = &self.payload.emote {
            write!(f, " {emote}")?;
        }
        if self.in_burst {
            write!(f, " *")?;
        }
        Ok(())
    }
}
