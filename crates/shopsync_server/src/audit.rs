//! Server-side audit log appends.

use crate::error::ServerResult;
use shopsync_core::entity::{AuditEntry, SyncEntity};
use shopsync_core::{Store, TableTxn};

/// Appends audit entries on behalf of server-side operations.
///
/// Client-side entries arrive through the upload reconciler like any other
/// entity; this path is for facts the server itself observes. The log is
/// append-only in both paths: an entry, once written, is never compared,
/// updated, or removed.
#[derive(Debug, Default)]
pub struct AuditRecorder;

impl AuditRecorder {
    /// Validates and appends one entry, returning its assigned id.
    ///
    /// An entry arriving with an already-known id is left untouched and its
    /// id echoed back, so replays are harmless.
    pub fn record(store: &Store, mut entry: AuditEntry) -> ServerResult<i64> {
        entry.normalize_action();
        entry.validate()?;

        let id = store.write(|txn: &mut TableTxn<'_, AuditEntry>| {
            if let Some(id) = entry.id {
                if txn.get(&id).is_some() {
                    return Ok(id);
                }
            }
            txn.insert(entry.clone())
        })?;

        tracing::debug!(
            id,
            table = %entry.table_name,
            action = %entry.action,
            "audit entry recorded"
        );
        Ok(id)
    }
}
