//! Soft-delete and restore lifecycle for virtual transactions.

use crate::error::ServerResult;
use chrono::NaiveDateTime;
use shopsync_core::entity::{SyncEntity, VirtualTransaction};
use shopsync_core::{CorbeilleRecord, Store, TableTxn};
use shopsync_protocol::{CorbeilleQuery, DeleteRequest, RestoreRequest};

/// Moves transactions between the active table and the corbeille.
///
/// Both lifecycle operations span the two tables and run inside a single
/// paired transaction: a transaction is never visible in both places, and
/// never lost from both. Lock order is active table first, corbeille
/// second, in every path.
#[derive(Debug, Default)]
pub struct CorbeilleManager;

impl CorbeilleManager {
    /// Soft-deletes a transaction: removes it from the active table and
    /// snapshots it into the corbeille with deletion provenance.
    ///
    /// A transaction deleted, restored, and deleted again overwrites its
    /// restored history row; the corbeille keeps the latest deletion.
    pub fn delete(
        store: &Store,
        request: &DeleteRequest,
        now: NaiveDateTime,
    ) -> ServerResult<CorbeilleRecord> {
        let record = store.write_pair(
            |active: &mut TableTxn<'_, VirtualTransaction>,
             bin: &mut TableTxn<'_, CorbeilleRecord>| {
                let row = active.remove(&request.reference).ok_or_else(|| {
                    shopsync_core::CoreError::not_found(
                        VirtualTransaction::ENTITY,
                        request.reference.as_str(),
                    )
                })?;

                let mut record = CorbeilleRecord::from_active(
                    row,
                    request.deleted_by_agent_id,
                    request.deleted_by_agent_name.as_deref(),
                    now,
                    request.deletion_reason.as_deref(),
                );
                // The snapshot re-enters every client's corbeille feed.
                record
                    .transaction
                    .meta
                    .touch(now, request.deleted_by_agent_name.as_deref());

                match bin.get(&request.reference).cloned() {
                    None => {
                        bin.insert(record.clone())?;
                    }
                    Some(prior) if prior.is_restored => {
                        bin.replace(&request.reference, record.clone())?;
                    }
                    Some(_) => {
                        return Err(shopsync_core::CoreError::duplicate(
                            CorbeilleRecord::ENTITY,
                            request.reference.as_str(),
                        ));
                    }
                }
                Ok(record)
            },
        )?;

        tracing::info!(
            reference = %request.reference,
            agent = request.deleted_by_agent_name.as_deref().unwrap_or("<unknown>"),
            "transaction moved to corbeille"
        );
        Ok(record)
    }

    /// Restores a corbeille row into the active table.
    ///
    /// Only a pending row (`is_restored = false`) can be restored; a missing
    /// or already-restored row answers not-found, so a retried restore is
    /// loud rather than silently double-applied. The corbeille row is kept
    /// as history with its restoration provenance filled in.
    pub fn restore(
        store: &Store,
        request: &RestoreRequest,
        now: NaiveDateTime,
    ) -> ServerResult<VirtualTransaction> {
        let restored = store.write_pair(
            |active: &mut TableTxn<'_, VirtualTransaction>,
             bin: &mut TableTxn<'_, CorbeilleRecord>| {
                let mut record = bin
                    .get(&request.reference)
                    .filter(|record| !record.is_restored)
                    .cloned()
                    .ok_or_else(|| {
                        shopsync_core::CoreError::not_found(
                            CorbeilleRecord::ENTITY,
                            request.reference.as_str(),
                        )
                    })?;

                record.mark_restored(
                    &request.restored_by,
                    now,
                    request.restoration_reason.as_deref(),
                );

                let transaction = record.transaction.clone();
                if active.get(&request.reference).is_some() {
                    active.replace(&request.reference, transaction.clone())?;
                } else {
                    active.insert(transaction.clone())?;
                }
                bin.replace(&request.reference, record)?;
                Ok(transaction)
            },
        )?;

        tracing::info!(
            reference = %request.reference,
            restored_by = %request.restored_by,
            "transaction restored from corbeille"
        );
        Ok(restored)
    }

    /// Lists corbeille rows, pending-only by default, newest deletion
    /// first.
    pub fn list(store: &Store, query: &CorbeilleQuery) -> Vec<CorbeilleRecord> {
        let mut rows: Vec<CorbeilleRecord> = store
            .snapshot::<CorbeilleRecord>()
            .into_iter()
            .filter(|record| query.include_restored || !record.is_restored)
            .filter(|record| match query.shop_id {
                Some(shop) => record.transaction.shop_id == shop,
                None => true,
            })
            .collect();
        rows.sort_by(|a, b| b.deletion_date.cmp(&a.deletion_date));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use shopsync_core::timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    fn seed_transaction(store: &Store, reference: &str, shop_id: i64) {
        let row: VirtualTransaction = serde_json::from_value(serde_json::json!({
            "reference": reference,
            "montant_virtuel": 75.0,
            "montant_cash": 75.0,
            "sim_numero": "+243700000001",
            "shop_id": shop_id,
            "agent_id": 2,
            "last_modified_at": "2024-07-01 08:00:00"
        }))
        .unwrap();
        store
            .write(|txn: &mut TableTxn<'_, VirtualTransaction>| txn.insert(row))
            .unwrap();
    }

    fn delete_request(reference: &str) -> DeleteRequest {
        DeleteRequest {
            reference: reference.to_string(),
            deleted_by_agent_id: Some(2),
            deleted_by_agent_name: Some("agent2".to_string()),
            deletion_reason: Some("erreur de saisie".to_string()),
        }
    }

    fn restore_request(reference: &str) -> RestoreRequest {
        RestoreRequest {
            reference: reference.to_string(),
            restored_by: "admin1".to_string(),
            restoration_reason: None,
        }
    }

    #[test]
    fn delete_moves_row_between_tables() {
        let store = Store::new();
        seed_transaction(&store, "VT-1", 1);

        let record =
            CorbeilleManager::delete(&store, &delete_request("VT-1"), ts("2024-07-02 09:00:00"))
                .unwrap();

        assert!(!record.is_restored);
        assert_eq!(record.deletion_reason.as_deref(), Some("erreur de saisie"));
        let stats = store.stats();
        assert_eq!(stats.virtual_transactions, 0);
        assert_eq!(stats.virtual_transactions_corbeille, 1);
    }

    #[test]
    fn delete_of_unknown_reference_is_not_found() {
        let store = Store::new();
        let err =
            CorbeilleManager::delete(&store, &delete_request("VT-9"), ts("2024-07-02 09:00:00"))
                .unwrap_err();
        assert!(matches!(err, ServerError::NotFound { .. }));
    }

    #[test]
    fn restore_round_trip() {
        let store = Store::new();
        seed_transaction(&store, "VT-1", 1);
        CorbeilleManager::delete(&store, &delete_request("VT-1"), ts("2024-07-02 09:00:00"))
            .unwrap();

        let when = ts("2024-07-03 10:00:00");
        let restored =
            CorbeilleManager::restore(&store, &restore_request("VT-1"), when).unwrap();

        assert_eq!(restored.reference, "VT-1");
        // Back in the active table, flagged for re-download.
        assert!(!restored.meta.is_synced);
        assert_eq!(restored.meta.last_modified_at, when);

        // The corbeille keeps the history row.
        let stats = store.stats();
        assert_eq!(stats.virtual_transactions, 1);
        assert_eq!(stats.virtual_transactions_corbeille, 1);
        let record: CorbeilleRecord = store.get(&"VT-1".to_string()).unwrap();
        assert!(record.is_restored);
        assert_eq!(record.restored_by.as_deref(), Some("admin1"));
    }

    #[test]
    fn second_restore_is_not_found() {
        let store = Store::new();
        seed_transaction(&store, "VT-1", 1);
        CorbeilleManager::delete(&store, &delete_request("VT-1"), ts("2024-07-02 09:00:00"))
            .unwrap();
        CorbeilleManager::restore(&store, &restore_request("VT-1"), ts("2024-07-03 10:00:00"))
            .unwrap();

        let err = CorbeilleManager::restore(
            &store,
            &restore_request("VT-1"),
            ts("2024-07-03 10:05:00"),
        )
        .unwrap_err();
        assert!(matches!(err, ServerError::NotFound { .. }));
    }

    #[test]
    fn delete_after_restore_overwrites_history() {
        let store = Store::new();
        seed_transaction(&store, "VT-1", 1);
        CorbeilleManager::delete(&store, &delete_request("VT-1"), ts("2024-07-02 09:00:00"))
            .unwrap();
        CorbeilleManager::restore(&store, &restore_request("VT-1"), ts("2024-07-03 10:00:00"))
            .unwrap();

        let again = ts("2024-07-04 11:00:00");
        let record = CorbeilleManager::delete(&store, &delete_request("VT-1"), again).unwrap();

        assert!(!record.is_restored);
        assert_eq!(record.deletion_date, again);
        assert_eq!(store.stats().virtual_transactions_corbeille, 1);
    }

    #[test]
    fn list_is_pending_only_by_default() {
        let store = Store::new();
        seed_transaction(&store, "VT-1", 1);
        seed_transaction(&store, "VT-2", 2);
        CorbeilleManager::delete(&store, &delete_request("VT-1"), ts("2024-07-02 09:00:00"))
            .unwrap();
        CorbeilleManager::delete(&store, &delete_request("VT-2"), ts("2024-07-02 09:30:00"))
            .unwrap();
        CorbeilleManager::restore(&store, &restore_request("VT-1"), ts("2024-07-03 10:00:00"))
            .unwrap();

        let pending = CorbeilleManager::list(&store, &CorbeilleQuery::default());
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].transaction.reference, "VT-2");

        let all = CorbeilleManager::list(
            &store,
            &CorbeilleQuery {
                include_restored: true,
                ..CorbeilleQuery::default()
            },
        );
        assert_eq!(all.len(), 2);

        let shop_1 = CorbeilleManager::list(
            &store,
            &CorbeilleQuery {
                shop_id: Some(1),
                include_restored: true,
                ..CorbeilleQuery::default()
            },
        );
        assert_eq!(shop_1.len(), 1);
    }
}
