//! Table-driven chat content.
//!
//! A [`ContentTable`] holds the lines each kind can say, the pool of viewer
//! names and emotes, and the donation amount range. [`TableSampler`] binds a
//! table to a kind catalog and plugs it into the engine as its
//! [`PayloadSampler`].
//!
//! ```toml
//! authors = ["pixel_pete", "mossy"]
//! emotes = ["PogChamp", "KEKW"]
//!
//! [donation_amount]
//! min = 100
//! max = 2000
//!
//! [[lines.crowd]]
//! id = 1001
//! text = "lets gooo"
//! weight = 2.0
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use chatfeed_core::error::{ChatFeedError, Result};
use chatfeed_core::{EventPayload, KindId, RandomSource, RuleProfile, RuntimeState};
use chatfeed_core::sampler::PayloadSampler;

/// One line a kind can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Stable content id. Zero is reserved for "no id".
    pub id: u64,
    /// Message text.
    pub text: String,
    /// Relative pick weight within its kind.
    #[serde(default = "default_entry_weight")]
    pub weight: f64,
}

impl ContentEntry {
    /// Entry with weight `1.0`.
    #[must_use]
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            weight: default_entry_weight(),
        }
    }
}

/// Inclusive donation amount range, in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    /// Smallest amount drawn.
    pub min: u64,
    /// Largest amount drawn.
    pub max: u64,
}

impl Default for AmountRange {
    fn default() -> Self {
        Self { min: 100, max: 5000 }
    }
}

/// Lines, authors and emotes for a whole feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTable {
    /// Viewer names attached to audience messages.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Emotes attached to messages of the kinds in `emote_kinds`.
    #[serde(default)]
    pub emotes: Vec<String>,
    /// Kinds whose payload carries an emote.
    #[serde(default = "default_emote_kinds")]
    pub emote_kinds: Vec<String>,
    /// Kinds whose payload carries no author name.
    #[serde(default = "default_anonymous_kinds")]
    pub anonymous_kinds: Vec<String>,
    /// Amounts drawn for donation events.
    #[serde(default)]
    pub donation_amount: AmountRange,
    /// Lines per kind name.
    #[serde(default)]
    pub lines: BTreeMap<String, Vec<ContentEntry>>,
}

impl ContentTable {
    /// Load a table from a TOML string. Not validated against any catalog
    /// yet; see [`ContentTable::validate`].
    ///
    /// # Errors
    /// Returns `ChatFeedError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ChatFeedError::Config(e.to_string()))
    }

    /// Load a table from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check the table against `profile`'s kind catalog.
    ///
    /// # Errors
    /// `UnknownKind` for a line pool, emote kind or anonymous kind not in
    /// the catalog,
    /// `Config` for a zero or duplicated id, a negative or non-finite
    /// weight, or an inverted amount range.
    pub fn validate(&self, profile: &RuleProfile) -> Result<()> {
        let mut seen = HashSet::new();
        for (kind, entries) in &self.lines {
            if profile.kinds.index_of(kind).is_none() {
                return Err(ChatFeedError::UnknownKind(kind.clone()));
            }
            for entry in entries {
                if entry.id == 0 {
                    return Err(ChatFeedError::Config(format!(
                        "content id 0 is reserved ({kind}: {:?})",
                        entry.text
                    )));
                }
                if !seen.insert(entry.id) {
                    return Err(ChatFeedError::Config(format!(
                        "duplicate content id: {}",
                        entry.id
                    )));
                }
                if !entry.weight.is_finite() || entry.weight < 0.0 {
                    return Err(ChatFeedError::Config(format!(
                        "content {} has invalid weight {}",
                        entry.id, entry.weight
                    )));
                }
            }
        }
        for kind in self.emote_kinds.iter().chain(&self.anonymous_kinds) {
            if profile.kinds.index_of(kind).is_none() {
                return Err(ChatFeedError::UnknownKind(kind.clone()));
            }
        }
        if self.donation_amount.min > self.donation_amount.max {
            return Err(ChatFeedError::Config(format!(
                "donation amount range is inverted: {} > {}",
                self.donation_amount.min, self.donation_amount.max
            )));
        }
        Ok(())
    }

    /// Total number of lines across all kinds.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    /// A small stock table for the default six-kind catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let pool = |base: u64, texts: &[&str]| -> Vec<ContentEntry> {
            texts
                .iter()
                .zip(base..)
                .map(|(text, id)| ContentEntry::new(id, *text))
                .collect()
        };

        let mut lines = BTreeMap::new();
        lines.insert(
            "crowd".to_string(),
            pool(
                1000,
                &[
                    "lets gooo",
                    "no way",
                    "that was clean",
                    "first time here, love the vibe",
                    "what did I just watch",
                    "chat is this real",
                    "W streamer",
                    "he's cooking",
                    "clip it",
                    "lmao",
                    "ok that was lucky",
                    "again again",
                    "hi from Brazil",
                    "this run is cursed",
                    "hydrate check",
                    "can we get a hype train",
                    "the music slaps",
                    "bro forgot the objective",
                    "calling it now, he wins this",
                    "we believe",
                    "huh",
                    "actual gameplay?",
                    "5 more minutes",
                    "that jump though",
                    "respect",
                    "chat behave",
                    "just got here what happened",
                    "peak content",
                    "the comeback is real",
                    "insane reaction time",
                ],
            ),
        );
        lines.insert(
            "donation".to_string(),
            pool(
                2000,
                &[
                    "keep it up!",
                    "for the snacks",
                    "that play deserved this",
                    "buy yourself a new chair",
                    "love the streams",
                    "happy birthday!",
                    "tip for the clutch",
                    "first donation ever",
                ],
            ),
        );
        lines.insert(
            "host".to_string(),
            pool(
                3000,
                &[
                    "thanks for hanging out everyone",
                    "ok ok one more try",
                    "chat, should I go left or right?",
                    "remember to stretch",
                    "that's the best run so far",
                ],
            ),
        );
        lines.insert(
            "system".to_string(),
            pool(
                4000,
                &[
                    "A raid of 42 viewers is arriving!",
                    "Follower goal reached!",
                    "Slow mode is now on.",
                    "New subscriber!",
                ],
            ),
        );
        lines.insert(
            "emote".to_string(),
            pool(
                6000,
                &["", "x2", "x3", "!!", "W", "gg", "o7", "?", "hype", "lol", "...", "LETS GO"],
            ),
        );

        Self {
            authors: [
                "pixel_pete",
                "mossy",
                "lunaria",
                "tinfoil_tom",
                "frostbyte",
                "quietkat",
                "bigdipper",
                "nova_rae",
                "couchgoblin",
                "ozzy88",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            emotes: ["PogChamp", "KEKW", "LUL", "monkaS", "Kappa", "catJAM"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            emote_kinds: default_emote_kinds(),
            anonymous_kinds: default_anonymous_kinds(),
            donation_amount: AmountRange::default(),
            lines,
        }
    }
}

/// [`PayloadSampler`] backed by a [`ContentTable`].
///
/// Author names go on every kind not listed in the table's
/// `anonymous_kinds`.
#[derive(Debug, Clone)]
pub struct TableSampler {
    table: ContentTable,
    /// Line pools indexed by [`KindId`].
    pools: Vec<Vec<ContentEntry>>,
    emote_kind: Vec<bool>,
    authored: Vec<bool>,
    donation_kind: Option<KindId>,
}

impl TableSampler {
    /// Validate `table` against `profile` and bind it to the catalog.
    ///
    /// # Errors
    /// Returns the error from [`ContentTable::validate`].
    pub fn new(table: ContentTable, profile: &RuleProfile) -> Result<Self> {
        table.validate(profile)?;

        let kind_count = profile.kinds.len();
        let mut pools = vec![Vec::new(); kind_count];
        let mut emote_kind = vec![false; kind_count];
        let mut authored = vec![true; kind_count];
        for (id, name) in profile.kinds.iter() {
            if let Some(entries) = table.lines.get(name) {
                pools[id.index()].clone_from(entries);
            }
            emote_kind[id.index()] = table.emote_kinds.iter().any(|k| k == name);
            authored[id.index()] = !table.anonymous_kinds.iter().any(|k| k == name);
        }

        debug!(
            kinds = kind_count,
            lines = table.line_count(),
            authors = table.authors.len(),
            "Content table bound"
        );
        Ok(Self {
            table,
            pools,
            emote_kind,
            authored,
            donation_kind: profile.donation_kind(),
        })
    }

    /// Built-in table bound to `profile`.
    ///
    /// # Errors
    /// Fails if `profile`'s catalog lacks one of the built-in kinds.
    pub fn builtin(profile: &RuleProfile) -> Result<Self> {
        Self::new(ContentTable::builtin(), profile)
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &ContentTable {
        &self.table
    }

    /// Number of lines `kind` could produce right now.
    #[must_use]
    pub fn eligible_count(&self, kind: KindId, state: &RuntimeState) -> usize {
        self.eligible(kind, state).count()
    }

    fn eligible<'a>(
        &'a self,
        kind: KindId,
        state: &'a RuntimeState,
    ) -> impl Iterator<Item = &'a ContentEntry> + 'a {
        self.pools
            .get(kind.index())
            .into_iter()
            .flatten()
            .filter(move |e| e.weight > 0.0 && !state.recently_used(e.id))
    }

    fn pick_from<'a>(items: &'a [String], rng: &mut dyn RandomSource) -> Option<&'a String> {
        if items.is_empty() {
            return None;
        }
        let i = rng.range_int(0, items.len() as i64);
        items.get(usize::try_from(i).unwrap_or(0))
    }
}

impl PayloadSampler for TableSampler {
    fn try_sample(
        &mut self,
        kind: KindId,
        state: &RuntimeState,
        rng: &mut dyn RandomSource,
    ) -> Option<EventPayload> {
        let candidates: Vec<&ContentEntry> = self.eligible(kind, state).collect();
        let total: f64 = candidates.iter().map(|e| e.weight).sum();
        if candidates.is_empty() || total <= 0.0 {
            return None;
        }

        let draw = rng.range(0.0, total);
        let mut cumulative = 0.0;
        let mut chosen = candidates[candidates.len() - 1];
        for entry in candidates.iter().copied() {
            cumulative += entry.weight;
            if cumulative > draw {
                chosen = entry;
                break;
            }
        }

        let idx = kind.index();
        let mut payload = EventPayload::with_id(chosen.id);
        if !chosen.text.is_empty() {
            payload.text = Some(chosen.text.clone());
        }
        if self.authored.get(idx).copied().unwrap_or(false) {
            payload.author = Self::pick_from(&self.table.authors, rng).cloned();
        }
        if self.emote_kind.get(idx).copied().unwrap_or(false) {
            payload.emote = Self::pick_from(&self.table.emotes, rng).cloned();
        }
        if self.donation_kind == Some(kind) {
            let AmountRange { min, max } = self.table.donation_amount;
            let lo = i64::try_from(min).unwrap_or(i64::MAX);
            let hi = i64::try_from(max).unwrap_or(i64::MAX).saturating_add(1);
            payload.amount = u64::try_from(rng.range_int(lo, hi)).ok();
        }
        Some(payload)
    }
}

fn default_entry_weight() -> f64 {
    1.0
}

fn default_emote_kinds() -> Vec<String> {
    vec!["emote".to_string()]
}

fn default_anonymous_kinds() -> Vec<String> {
    vec!["host".to_string(), "system".to_string()]
}
