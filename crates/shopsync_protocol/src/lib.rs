//! Wire types for the shop synchronization API.
//!
//! Every exchange is a JSON document. Download endpoints answer with a
//! [`ChangesResponse`] page, uploads with an [`UploadResponse`] tally, and
//! any failure with an [`ErrorResponse`]. The envelope types are generic
//! over the entity payload so one shape serves all synchronized tables.
//!
//! This is a pure protocol crate with no I/O.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod changes;
pub mod corbeille;
pub mod upload;

pub use changes::{ChangesQuery, ChangesResponse};
pub use corbeille::{
    CorbeilleQuery, DeleteRequest, DeleteResponse, RestoreRequest, RestoreResponse,
};
pub use upload::{EntityError, UploadRequest, UploadResponse};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopsync_core::timestamp;

/// Failure envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-oriented error class, e.g. `"not_found"`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
    /// Server time of the failure.
    #[serde(with = "timestamp::wire")]
    pub timestamp: NaiveDateTime,
}

impl ErrorResponse {
    /// Builds a failure envelope.
    pub fn new(error: &str, message: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: message.to_string(),
            timestamp,
        }
    }
}
