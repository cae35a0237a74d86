//! Error types for the shopsync core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field is missing or a value is malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced row does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity type name.
        entity: &'static str,
        /// Natural key that was looked up.
        key: String,
    },

    /// A row with the same natural key already exists.
    #[error("{entity} already exists: {key}")]
    DuplicateKey {
        /// Entity type name.
        entity: &'static str,
        /// Conflicting natural key.
        key: String,
    },

    /// The storage layer is unavailable or an operation failed mid-flight.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl CoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a duplicate-key error.
    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        CoreError::DuplicateKey {
            entity,
            key: key.into(),
        }
    }
}
