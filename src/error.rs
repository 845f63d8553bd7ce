use thiserror::Error;

use crate::validation::ValidationError;

/// Custom error types for the sequential thinking server
#[derive(Error, Debug)]
pub enum ThinkingError {
    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert ValidationError to ThinkingError
impl From<ValidationError> for ThinkingError {
    fn from(err: ValidationError) -> Self {
        ThinkingError::Validation {
            field: err.field().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Convert ThinkingError to MCP-compatible ErrorData
impl From<ThinkingError> for rmcp::model::ErrorData {
    fn from(err: ThinkingError) -> Self {
        match err {
            ThinkingError::Validation { .. } => {
                rmcp::model::ErrorData::invalid_params(err.to_string(), None)
            }
            _ => rmcp::model::ErrorData::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ThinkingError>;
