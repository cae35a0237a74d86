//! Upload batch messages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopsync_core::timestamp;

/// A batch of locally-changed rows pushed by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest<T> {
    /// The rows to reconcile, in client order.
    pub entities: Vec<T>,
    /// Acting user, recorded as `last_modified_by` on accepted rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Client clock when the batch was assembled. Informational only; the
    /// server never uses it for conflict decisions.
    #[serde(default, with = "timestamp::wire_opt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl<T> UploadRequest<T> {
    /// Builds a batch for `entities`.
    pub fn new(entities: Vec<T>) -> Self {
        Self {
            entities,
            user_id: None,
            timestamp: None,
        }
    }

    /// Sets the acting user.
    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }
}

/// Per-entity failure within an otherwise-processed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityError {
    /// The failed row's natural key label.
    pub entity_id: String,
    /// What went wrong.
    pub error: String,
}

/// Outcome of reconciling an upload batch.
///
/// A batch is processed row by row; one bad row never aborts the rest.
/// `success` stays `true` as long as the batch itself was processed; row
/// failures are carried in `errors`, never in `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// True once the batch was processed; per-row failures are in `errors`.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Rows inserted as new.
    pub uploaded: usize,
    /// Rows that replaced an older server version.
    pub updated: usize,
    /// Rows skipped because the server version was same-aged or newer.
    pub skipped: usize,
    /// Rows examined, including failures.
    pub total: usize,
    /// Per-row failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EntityError>,
    /// Server time the batch finished.
    #[serde(with = "timestamp::wire")]
    pub timestamp: NaiveDateTime,
}
