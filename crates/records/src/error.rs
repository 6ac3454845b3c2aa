//! Error types for the records crate.
//!
//! Three kinds of failure matter to callers of the aggregation engine:
//! - validation failures (bad record, bad date, unknown location)
//! - lifecycle misuse of a `RecordSet`
//! - failures surfaced verbatim from a provider adapter
//!
//! The remaining variants cover loading the files that feed the engine.

use thiserror::Error;

/// Errors that can occur while building, aggregating or loading showtimes
#[derive(Error, Debug)]
pub enum ShowtimeError {
    /// Input was rejected before any aggregation work started
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation attempted in the wrong `RecordSet` lifecycle state
    ///
    /// Always a caller bug; never worth retrying.
    #[error("invalid state: {0}")]
    State(String),

    /// A provider adapter failed (network, markup, missing snapshot data...)
    #[error("provider `{provider}` failed: {reason}")]
    Adapter { provider: String, reason: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A data file was readable but its content made no sense
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },
}

impl ShowtimeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ShowtimeError::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        ShowtimeError::State(msg.into())
    }

    pub fn adapter(provider: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ShowtimeError::Adapter {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ShowtimeError::Validation(_))
    }

    pub fn is_state(&self) -> bool {
        matches!(self, ShowtimeError::State(_))
    }

    pub fn is_adapter(&self) -> bool {
        matches!(self, ShowtimeError::Adapter { .. })
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ShowtimeError>;
