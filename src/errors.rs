// errors.rs
use thiserror::Error;

/// Errors raised anywhere in the trend pipeline, from row validation
/// through snapshot download and rate fetching.
#[derive(Error, Debug)]
pub enum TrendError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Snapshot fetch failed: {0}")]
    SnapshotFetchFailed(String),

    #[error("Database error: {0}")]
    DbError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TrendError {
    /// Network-shaped failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TrendError::UpstreamUnavailable(_) | TrendError::SnapshotFetchFailed(_)
        )
    }
}

impl From<rusqlite::Error> for TrendError {
    fn from(e: rusqlite::Error) -> Self {
        TrendError::DbError(e.to_string())
    }
}

impl From<serde_json::Error> for TrendError {
    fn from(e: serde_json::Error) -> Self {
        TrendError::Serialization(e.to_string())
    }
}
