use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::warn;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors the engine surfaces to callers.
///
/// Malformed *data* (opening-hours rows, durations, coordinates) never
/// produces an error: it is skipped and the computation degrades. Errors are
/// reserved for contract-level misuse of the API and for operation batches
/// coming from the assistant, which are untrusted by definition.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("invalid operation at index {index}: {reason}")]
    InvalidOperation { index: usize, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "engine::validation", %message, "validation error");
        EngineError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "engine::validation", %message, details = %details, "validation error with details");
        EngineError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn invalid_operation(index: usize, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(target: "engine::operations", index, %reason, "invalid operation");
        EngineError::InvalidOperation { index, reason }
    }
}
