//! Soft-delete and restore messages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shopsync_core::timestamp;

/// Request to soft-delete a virtual transaction into the corbeille.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Reference of the transaction to delete.
    pub reference: String,
    /// Agent id performing the deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by_agent_id: Option<i64>,
    /// Agent name performing the deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by_agent_name: Option<String>,
    /// Stated reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_reason: Option<String>,
}

/// Acknowledgement of a soft deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true`; failures use [`ErrorResponse`](crate::ErrorResponse).
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Reference of the deleted transaction.
    pub reference: String,
    /// When the deletion was recorded.
    #[serde(with = "timestamp::wire")]
    pub deleted_at: NaiveDateTime,
}

/// Request to restore a corbeille row into the active table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreRequest {
    /// Reference of the transaction to restore.
    pub reference: String,
    /// Actor performing the restoration.
    pub restored_by: String,
    /// Stated reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restoration_reason: Option<String>,
}

/// Acknowledgement of a restoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResponse {
    /// Always `true`; failures use [`ErrorResponse`](crate::ErrorResponse).
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Reference of the restored transaction.
    pub reference: String,
    /// Actor who performed the restoration.
    pub restored_by: String,
    /// When the restoration was recorded.
    #[serde(with = "timestamp::wire")]
    pub restored_at: NaiveDateTime,
}

/// Parameters of a corbeille listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorbeilleQuery {
    /// Restrict to one shop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<i64>,
    /// Also list rows already restored. Defaults to pending-only.
    #[serde(default)]
    pub include_restored: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_request_needs_only_a_reference() {
        let request: DeleteRequest =
            serde_json::from_value(serde_json::json!({ "reference": "VT-9" })).unwrap();
        assert_eq!(request.reference, "VT-9");
        assert!(request.deletion_reason.is_none());
    }

    #[test]
    fn corbeille_query_defaults_to_pending_only() {
        let query: CorbeilleQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!query.include_restored);
    }
}
