//! Error taxonomy for Irrigo.

use thiserror::Error;

/// All errors that can surface from Irrigo components.
#[derive(Debug, Error)]
pub enum IrrigoError {
    /// Configuration file unreadable or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// Malformed schedule input — rejected before it reaches the engine.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Schedule document unreadable or unwritable.
    #[error("Store error: {0}")]
    Store(String),

    /// Pump controller call failed (network or non-2xx response).
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// Requested schedule does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, IrrigoError>;
