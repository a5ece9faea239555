//! Error types shared by the feed and the dashboard.
//!
//! The `QuoteError` enum unifies common failure cases for I/O, serialization,
//! ticker validation, filter expressions, quote fetching and channel
//! communication, allowing crates to propagate a single error type.
use std::io;

use thiserror::Error;

/// Unified error type shared by the feed and the dashboard.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// I/O error originating from the standard library, the terminal or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A ticker symbol that contains unsupported characters or is too long.
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// The filter expression could not be parsed or evaluated.
    #[error("Filter error: {0}")]
    Filter(String),

    /// The filter expression evaluated to something other than `true`/`false`.
    #[error("Filter expression `{0}` must yield a boolean")]
    FilterNotBoolean(String),

    /// Quote or market data could not be retrieved from the quote source.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Settings could not be read or written.
    #[error("Profile error: {0}")]
    Profile(String),

    /// Crossbeam/channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Crossbeam/channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),
}

impl From<evalexpr::EvalexprError> for QuoteError {
    fn from(err: evalexpr::EvalexprError) -> Self {
        QuoteError::Filter(err.to_string())
    }
}
