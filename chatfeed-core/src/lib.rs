//! # Chat Feed Core Library
//!
//! Host-agnostic engine that makes a simulated live chat feel alive.
//!
//! Every broadcast gets a [`ChatEngine`] that decides, tick by tick:
//!
//! - **When** something happens: time-accumulator scheduling with rate
//!   jitter, robust to any frame time
//! - **What** happens: weighted kind selection under cooldowns, streak
//!   caps, donation pacing and an anti-repeat window
//! - **How it reacts**: decaying signal boosts when the host speaks, a
//!   donation lands or the player types
//! - **When it spikes**: a probabilistic burst sub-mode with its own pace
//!   and weights
//!
//! Content itself comes from a [`PayloadSampler`] supplied by the host.
//!
//! ## Determinism
//!
//! Given the same [`RuleProfile`], seed, `dt` sequence and signals, two
//! engines emit identical event sequences.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod random;
pub mod ring;
pub mod runtime;
pub mod sampler;
pub mod schedule;
pub mod selection;
pub mod signal;
pub mod types;

pub use config::RuleProfile;
pub use engine::{ChatEngine, MAX_DECISIONS_PER_TICK};
pub use error::ChatFeedError;
pub use random::{RandomSource, SeededRandom};
pub use runtime::RuntimeState;
pub use sampler::PayloadSampler;
pub use types::*;
