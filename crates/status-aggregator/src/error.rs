//! Error types for status-aggregator crate.
//!
//! Aggregation itself is total; errors come from policy construction and
//! from the collaborators a sync pass talks to.

use thiserror::Error;

/// Errors that can occur while building policies or publishing status.
#[derive(Debug, Error)]
pub enum StatusError {
    /// A condition-type pattern could not be compiled.
    #[error("invalid condition type pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Write lost an optimistic-concurrency race.
    #[error("conflict writing record {name}: expected version {expected}, found {actual}")]
    Conflict {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// Record to update does not exist.
    #[error("status record not found: {0}")]
    RecordNotFound(String),

    /// Record to create already exists.
    #[error("status record already exists: {0}")]
    AlreadyExists(String),

    /// Upstream condition source could not be read.
    #[error("condition source unavailable: {0}")]
    SourceUnavailable(String),

    /// Status sink could not be reached.
    #[error("status sink unavailable: {0}")]
    SinkUnavailable(String),

    /// Conflicts persisted across every retry.
    #[error("gave up writing record {name} after {attempts} attempts")]
    RetriesExhausted { name: String, attempts: u32 },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

impl StatusError {
    /// Whether a write lost a race with another writer, so a sync pass
    /// should re-read and try again.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StatusError::Conflict { .. } | StatusError::AlreadyExists(_)
        )
    }
}

impl From<config::ConfigError> for StatusError {
    fn from(err: config::ConfigError) -> Self {
        StatusError::ConfigurationError(err.to_string())
    }
}

/// Result type for status operations.
pub type StatusResult<T> = Result<T, StatusError>;
