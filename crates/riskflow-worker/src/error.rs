//! Error types for the stream worker

use thiserror::Error;

/// Result type alias for worker operations
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Stream worker errors
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Malformed input event; rejected and counted, never retried
    #[error("Input error: {0}")]
    Input(#[from] riskflow_core::CoreError),

    /// Transient dependency failure; safe to retry with backoff
    #[error("Transient dependency error: {0}")]
    Transient(String),

    /// Dependency failure after the retry budget is exhausted, or a response
    /// failing schema validation. Surfaced to the caller, never defaulted
    /// silently.
    #[error("Hard dependency failure: {0}")]
    Hard(String),

    /// Emission to a downstream channel failed
    #[error("Emit failed: {0}")]
    Emit(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkerError {
    /// True when a bounded retry is still worthwhile
    pub fn is_transient(&self) -> bool {
        matches!(self, WorkerError::Transient(_))
    }
}
