//! Error types for rfnet-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Malsized frame: expected {expected} bytes, got {actual}")]
    MalsizedFrame { expected: usize, actual: usize },

    #[error("Undecodable float field: {0}")]
    UndecodableFloat(String),

    #[error("Unknown sensor id: {0}")]
    UnknownSensor(u8),

    #[error("Unknown reading type: {0}")]
    UnknownReadingType(u16),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
