//! Broadcast events that bias the chat feed.
//!
//! These are the things happening "on stream" that the simulated audience
//! reacts to. Each maps to one or more [`SignalKind`]s.

use serde::{Deserialize, Serialize};

use chatfeed_core::SignalKind;

/// Something that happened in the broadcast the chat should react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastEvent {
    /// The host said something.
    HostSpoke {
        /// What was said, if known.
        #[serde(default)]
        line: Option<String>,
    },

    /// A donation landed.
    DonationReceived {
        /// Who donated.
        donor: String,
        /// Amount in the smallest currency unit.
        amount: u64,
    },

    /// A system notice appeared (raid, follower goal, moderation).
    SystemNotice {
        /// Notice text.
        text: String,
    },

    /// The player typed into chat.
    PlayerMessage {
        /// Message text.
        text: String,
    },
}

impl BroadcastEvent {
    /// Signals raised by this event.
    ///
    /// Donations at or above `big_donation_threshold` raise both the
    /// donation and the big-donation signal.
    #[must_use]
    pub fn signals(&self, big_donation_threshold: u64) -> Vec<SignalKind> {
        match self {
            Self::HostSpoke { .. } => vec![SignalKind::HostSpoke],
            Self::DonationReceived { amount, .. } => {
                if *amount >= big_donation_threshold {
                    vec![SignalKind::Donation, SignalKind::BigDonation]
                } else {
                    vec![SignalKind::Donation]
                }
            }
            Self::SystemNotice { .. } => vec![SignalKind::SystemNotice],
            Self::PlayerMessage { .. } => vec![SignalKind::PlayerMessage],
        }
    }

    /// Short label for logging.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::HostSpoke { .. } => "host_spoke",
            Self::DonationReceived { .. } => "donation_received",
            Self::SystemNotice { .. } => "system_notice",
            Self::PlayerMessage { .. } => "player_message",
        }
    }
}
