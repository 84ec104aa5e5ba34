//! # chatfeed-stream: Broadcast Integration for chatfeed
//!
//! This crate sits between the host-agnostic `chatfeed-core` engine and a
//! game or overlay that shows a live chat next to a broadcast.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Game / Stream Overlay           │
//! │  ┌───────────────────────────────────┐  │
//! │  │         chatfeed-stream           │  │
//! │  │  ┌─────────────┐ ┌─────────────┐  │  │
//! │  │  │   Session   │ │   Content   │  │  │
//! │  │  └──────┬──────┘ └──────┬──────┘  │  │
//! │  │         │               │         │  │
//! │  │         ▼               ▼         │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      chatfeed-core      │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: session settings (seed, mood, donation threshold, files)
//! - `content`: content tables and the table-backed payload sampler
//! - `events`: broadcast events and the signals they raise
//! - `presets`: mood presets that produce tuned rule profiles
//! - `session`: the per-broadcast driver owning engine and sampler

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]

pub mod config;
pub mod content;
pub mod events;
pub mod presets;
pub mod session;

pub use config::SessionConfig;
pub use content::{ContentEntry, ContentTable, TableSampler};
pub use events::BroadcastEvent;
pub use presets::FeedMood;
pub use session::BroadcastSession;
