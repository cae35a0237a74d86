//! Error types for the synchronization server.

use shopsync_core::CoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by the synchronization endpoints.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request itself is malformed: bad cursor, missing field, invalid
    /// payload.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The addressed record does not exist (or is not in the expected
    /// lifecycle state).
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Entity the lookup ran against.
        entity: String,
        /// The key that missed.
        key: String,
    },

    /// The request is valid but contradicts current server state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store failed out from under the request.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServerError {
    /// Builds an [`ServerError::InvalidRequest`].
    pub fn invalid(message: impl Into<String>) -> Self {
        ServerError::InvalidRequest(message.into())
    }

    /// Builds a [`ServerError::NotFound`].
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        ServerError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Returns true if the client caused this (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::NotFound { .. }
                | ServerError::Conflict(_)
        )
    }

    /// Returns true if the server caused this (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServerError::Storage(_))
    }

    /// Machine-oriented error class for the wire envelope.
    pub fn class(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::NotFound { .. } => "not_found",
            ServerError::Conflict(_) => "conflict",
            ServerError::Storage(_) => "storage",
        }
    }
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => ServerError::InvalidRequest(message),
            CoreError::InvalidTimestamp(message) => ServerError::InvalidRequest(message),
            CoreError::NotFound { entity, key } => ServerError::NotFound {
                entity: entity.to_string(),
                key,
            },
            CoreError::DuplicateKey { entity, key } => {
                ServerError::Conflict(format!("{entity} already has {key}"))
            }
            CoreError::Storage(message) => ServerError::Storage(message),
        }
    }
}
