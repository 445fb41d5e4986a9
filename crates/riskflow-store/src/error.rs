//! Error types for the store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence errors.
///
/// A failed write means the triggering item must not be acknowledged as
/// processed; the transport will redeliver it and the upsert semantics make
/// the repeat safe.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored value corrupt: {0}")]
    Corrupt(String),
}
