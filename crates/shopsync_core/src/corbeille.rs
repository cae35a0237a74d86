//! Corbeille: soft-delete holding area for virtual transactions.

use crate::entity::{SyncEntity, VirtualTransaction};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A soft-deleted virtual transaction: the full snapshot of the deleted row
/// plus deletion and restoration provenance.
///
/// The snapshot is the same [`VirtualTransaction`] type tagged with
/// provenance, not a hand-copied parallel schema, so the two shapes cannot
/// drift. Serde flattening keeps the wire representation flat, matching
/// what clients already exchange for the active table.
///
/// A transaction exists in exactly one of {active table, corbeille with
/// `is_restored = false`} at a time. Once restored, the corbeille row is
/// retained as history with `is_restored = true` and is excluded from
/// further restore attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorbeilleRecord {
    /// Full snapshot of the deleted transaction.
    #[serde(flatten)]
    pub transaction: VirtualTransaction,
    /// Agent id that deleted the transaction.
    #[serde(default)]
    pub deleted_by_agent_id: Option<i64>,
    /// Agent name that deleted the transaction.
    #[serde(default)]
    pub deleted_by_agent_name: Option<String>,
    /// When the deletion happened.
    #[serde(with = "timestamp::wire")]
    pub deletion_date: NaiveDateTime,
    /// Stated reason for the deletion.
    #[serde(default)]
    pub deletion_reason: Option<String>,
    /// Whether the transaction has been restored to the active table.
    #[serde(default)]
    pub is_restored: bool,
    /// Actor who restored the transaction.
    #[serde(default)]
    pub restored_by: Option<String>,
    /// When the restoration happened.
    #[serde(default, with = "timestamp::wire_opt")]
    pub restoration_date: Option<NaiveDateTime>,
    /// Stated reason for the restoration.
    #[serde(default)]
    pub restoration_reason: Option<String>,
}

impl CorbeilleRecord {
    /// Snapshots an active transaction into the corbeille.
    pub fn from_active(
        transaction: VirtualTransaction,
        deleted_by_agent_id: Option<i64>,
        deleted_by_agent_name: Option<&str>,
        deletion_date: NaiveDateTime,
        deletion_reason: Option<&str>,
    ) -> Self {
        Self {
            transaction,
            deleted_by_agent_id,
            deleted_by_agent_name: deleted_by_agent_name.map(String::from),
            deletion_date,
            deletion_reason: deletion_reason.map(String::from),
            is_restored: false,
            restored_by: None,
            restoration_date: None,
            restoration_reason: None,
        }
    }

    /// Marks the record restored, recording provenance.
    ///
    /// The caller is responsible for re-inserting the snapshot into the
    /// active table inside the same transaction.
    pub fn mark_restored(
        &mut self,
        restored_by: &str,
        restoration_date: NaiveDateTime,
        restoration_reason: Option<&str>,
    ) {
        self.is_restored = true;
        self.restored_by = Some(restored_by.to_string());
        self.restoration_date = Some(restoration_date);
        self.restoration_reason = restoration_reason.map(String::from);
        self.transaction
            .meta
            .touch(restoration_date, Some(restored_by));
    }
}

impl SyncEntity for CorbeilleRecord {
    type Key = String;

    const ENTITY: &'static str = "virtual_transactions_corbeille";

    fn id(&self) -> Option<i64> {
        self.transaction.id
    }

    fn set_id(&mut self, id: i64) {
        self.transaction.id = Some(id);
    }

    fn key(&self) -> Option<String> {
        Some(self.transaction.reference.clone())
    }

    fn key_label(&self) -> String {
        self.transaction.reference.clone()
    }

    fn meta(&self) -> &SyncMeta {
        &self.transaction.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.transaction.meta
    }

    fn validate(&self) -> CoreResult<()> {
        self.transaction.validate()
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.transaction.shop_id)
    }

    fn business_timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.deletion_date)
    }
}
