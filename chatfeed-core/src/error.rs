//! Error types for the chat feed core library.
//!
//! Errors only surface at the configuration boundary. The tick path is
//! infallible: degenerate input is clamped, never rejected.

use thiserror::Error;

/// Top-level error type for all chat feed operations.
#[derive(Error, Debug)]
pub enum ChatFeedError {
    /// A rule profile or content table is structurally invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A table refers to a kind that is not in the catalog.
    #[error("Unknown event kind: {0}")]
    UnknownKind(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ChatFeedError>;
