//! Error types for sensor-core

use thiserror::Error;

/// Result type alias for collaborator operations
pub type Result<T> = std::result::Result<T, SensorError>;

/// Collaborator error types
///
/// These are infrastructure faults. Business outcomes such as a missing or
/// disabled sensor are reported through [`crate::Lookup`] instead.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Mail delivery failed: {0}")]
    MailError(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid seed data: {0}")]
    InvalidSeed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
