//! Registration errors

use thiserror::Error;

/// Errors raised while registering resources or tools
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Resource already registered: {0}")]
    DuplicateResource(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid resource URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Invalid input schema for tool '{tool}': {reason}")]
    InvalidSchema { tool: String, reason: String },

    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

impl From<sensor_core::SensorError> for RegistryError {
    fn from(err: sensor_core::SensorError) -> Self {
        RegistryError::Collaborator(err.to_string())
    }
}
