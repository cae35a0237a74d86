//! Append-only audit log entries.

use super::{validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A field-level before/after record for compliance and reconciliation
/// debugging.
///
/// Audit entries are immutable facts: an upload of an already-known id is
/// skipped, never compared by timestamp or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Identity; client-assigned ids are honored, otherwise server-assigned.
    #[serde(default)]
    pub id: Option<i64>,
    /// Table the change applied to.
    pub table_name: String,
    /// Identifier of the changed record within that table.
    pub record_id: String,
    /// Action performed ("INSERT", "UPDATE", "DELETE", ...), uppercased.
    pub action: String,
    /// Field values before the change.
    #[serde(default)]
    pub old_values: Option<Value>,
    /// Field values after the change.
    #[serde(default)]
    pub new_values: Option<Value>,
    /// Names of the fields that changed.
    #[serde(default)]
    pub changed_fields: Option<Value>,
    /// Acting user id.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Acting user role.
    #[serde(default)]
    pub user_role: Option<String>,
    /// Acting username.
    #[serde(default)]
    pub username: Option<String>,
    /// Shop context of the change.
    #[serde(default)]
    pub shop_id: Option<i64>,
    /// Client IP address, when known.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Device description, when known.
    #[serde(default)]
    pub device_info: Option<String>,
    /// Stated reason for the change.
    #[serde(default)]
    pub reason: Option<String>,
    /// When the change happened.
    #[serde(with = "timestamp::wire")]
    pub created_at: NaiveDateTime,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl AuditEntry {
    /// Normalizes the action to its canonical uppercase form.
    pub fn normalize_action(&mut self) {
        self.action = self.action.to_uppercase();
    }
}

impl SyncEntity for AuditEntry {
    type Key = i64;

    const ENTITY: &'static str = "audit_log";
    const APPEND_ONLY: bool = true;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn key_label(&self) -> String {
        match self.id {
            Some(id) => format!("{id}"),
            None => format!("{}:{}", self.table_name, self.record_id),
        }
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_required("table_name", &self.table_name)?;
        validate_required("record_id", &self.record_id)?;
        validate_required("action", &self.action)
    }

    fn shop_id(&self) -> Option<i64> {
        self.shop_id
    }

    fn business_timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.created_at)
    }
}
