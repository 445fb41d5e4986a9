//! Error types for Riskflow Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Event is missing a required field or carries an unusable value.
    /// Input errors are rejected and counted, never retried.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Configuration is internally inconsistent. Fatal at startup.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
