//! Error types for the agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent errors.
///
/// Reasoning-path failures (`LlmUnavailable`, `InvalidResponse`) are always
/// absorbed by the policy fallback and never propagate out of the
/// recommendation engine; only persistence and emission failures do, so the
/// transport can redeliver the alert.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Reasoning service unreachable or timed out
    #[error("Reasoning service unavailable: {0}")]
    LlmUnavailable(String),

    /// Reasoning service answered, but the payload failed strict validation
    #[error("Invalid reasoning response: {0}")]
    InvalidResponse(String),

    /// Store write failed; alert must not be acknowledged
    #[error("Store error: {0}")]
    Store(#[from] riskflow_store::StoreError),

    /// Downstream emission failed after the write was acknowledged
    #[error("Emit failed: {0}")]
    Emit(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
