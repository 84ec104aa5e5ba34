//! Session-level configuration for a broadcast chat feed.
//!
//! Wraps the core [`RuleProfile`] with the choices a host makes once per
//! broadcast: seed, mood, donation threshold and where content comes from.
//!
//! ```toml
//! seed = 42
//! mood = "hype"
//! big_donation_threshold = 2500
//! content_path = "chat_lines.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use chatfeed_core::error::{ChatFeedError, Result};
use chatfeed_core::RuleProfile;

use crate::content::ContentTable;
use crate::presets::FeedMood;

/// Everything needed to start a [`crate::session::BroadcastSession`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed seed for a reproducible feed. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Donations at or above this amount also raise the big-donation signal.
    #[serde(default = "default_big_donation_threshold")]
    pub big_donation_threshold: u64,
    /// Preset used when no explicit profile is given.
    #[serde(default)]
    pub mood: FeedMood,
    /// Rule profile file. Overrides `mood`.
    #[serde(default)]
    pub profile_path: Option<PathBuf>,
    /// Content table file. The built-in table is used when unset.
    #[serde(default)]
    pub content_path: Option<PathBuf>,
    /// Inline rule profile. Overrides both `mood` and `profile_path`.
    #[serde(default)]
    pub profile: Option<RuleProfile>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            big_donation_threshold: default_big_donation_threshold(),
            mood: FeedMood::default(),
            profile_path: None,
            content_path: None,
            profile: None,
        }
    }
}

impl SessionConfig {
    /// Load from a TOML string.
    ///
    /// # Errors
    /// Returns `ChatFeedError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ChatFeedError::Config(e.to_string()))
    }

    /// Load from a TOML file. Relative paths inside the file are resolved
    /// against the file's directory.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            for p in [&mut config.profile_path, &mut config.content_path]
                .into_iter()
                .flatten()
            {
                if p.is_relative() {
                    *p = dir.join(&*p);
                }
            }
        }
        Ok(config)
    }

    /// The rule profile this session runs, validated.
    ///
    /// # Errors
    /// Returns the load or validation error of the chosen profile.
    pub fn resolve_profile(&self) -> Result<RuleProfile> {
        let profile = if let Some(profile) = &self.profile {
            info!("Using inline rule profile");
            profile.clone()
        } else if let Some(path) = &self.profile_path {
            info!(path = %path.display(), "Loading rule profile");
            RuleProfile::from_file(path)?
        } else {
            info!(mood = %self.mood, "Using mood preset");
            self.mood.profile()
        };
        profile.validate()?;
        Ok(profile)
    }

    /// The content table this session samples from. Not yet validated
    /// against a profile.
    ///
    /// # Errors
    /// Returns the load error of `content_path`.
    pub fn resolve_content(&self) -> Result<ContentTable> {
        match &self.content_path {
            Some(path) => {
                info!(path = %path.display(), "Loading content table");
                ContentTable::from_file(path)
            }
            None => Ok(ContentTable::builtin()),
        }
    }
}

fn default_big_donation_threshold() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_standard_mood() {
        let config = SessionConfig::from_toml("").expect("empty is valid");
        assert_eq!(config.mood, FeedMood::Standard);
        assert_eq!(config.big_donation_threshold, 1000);
        assert!(config.seed.is_none());
    }

    #[test]
    fn mood_is_read_from_toml() {
        let config = SessionConfig::from_toml("seed = 7\nmood = \"quiet\"").expect("valid");
        assert_eq!(config.seed, Some(7));
        let profile = config.resolve_profile().expect("preset validates");
        assert_eq!(
            profile.rate.base_rate_per_sec,
            FeedMood::Quiet.profile().rate.base_rate_per_sec
        );
    }

    #[test]
    fn inline_profile_overrides_mood() {
        let config = SessionConfig::from_toml(
            r#"
            mood = "hype"

            [profile.rate]
            base_rate_per_sec = 0.5
            "#,
        )
        .expect("valid");
        let profile = config.resolve_profile().expect("valid profile");
        assert_eq!(profile.rate.base_rate_per_sec, 0.5);
    }

    #[test]
    fn invalid_inline_profile_is_rejected() {
        let config = SessionConfig::from_toml(
            r#"
            [profile.selection.weights]
            lurker = 2.0
            "#,
        )
        .expect("parses");
        assert!(matches!(
            config.resolve_profile(),
            Err(ChatFeedError::UnknownKind(_))
        ));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("lines.toml"),
            "[[lines.crowd]]\nid = 9\ntext = \"yo\"\n",
        )
        .expect("write content");
        let config_path = dir.path().join("session.toml");
        std::fs::write(&config_path, "content_path = \"lines.toml\"\n").expect("write config");

        let config = SessionConfig::from_file(&config_path).expect("loads");
        let table = config.resolve_content().expect("content loads");
        assert_eq!(table.lines["crowd"][0].id, 9);
    }
}
