//! Upload batch reconciliation.

use crate::error::ServerResult;
use chrono::NaiveDateTime;
use shopsync_core::entity::{Sim, SimMovement, SyncEntity};
use shopsync_core::{HasTable, Store, TableTxn};
use shopsync_protocol::{EntityError, UploadResponse};

/// Running tally of one batch reconciliation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    /// Rows inserted as new.
    pub uploaded: usize,
    /// Rows that replaced an older server version.
    pub updated: usize,
    /// Rows skipped: server version same-aged or newer, or append-only
    /// duplicate.
    pub skipped: usize,
    /// Per-row failures.
    pub errors: Vec<EntityError>,
}

impl BatchReport {
    /// Rows examined, including failures.
    pub fn total(&self) -> usize {
        self.uploaded + self.updated + self.skipped + self.errors.len()
    }

    /// True when no row failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the tally into the wire response.
    pub fn into_response(self, now: NaiveDateTime) -> UploadResponse {
        let message = if self.is_clean() {
            format!(
                "{} processed: {} new, {} updated, {} skipped",
                self.total(),
                self.uploaded,
                self.updated,
                self.skipped
            )
        } else {
            format!(
                "{} processed, {} failed: {} new, {} updated, {} skipped",
                self.total(),
                self.errors.len(),
                self.uploaded,
                self.updated,
                self.skipped
            )
        };
        // success reports that the batch was processed; row failures travel
        // in errors so a retry-safe client never re-sends the whole batch
        // over one bad row.
        UploadResponse {
            success: true,
            message,
            uploaded: self.uploaded,
            updated: self.updated,
            skipped: self.skipped,
            total: self.total(),
            errors: self.errors,
            timestamp: now,
        }
    }

    fn fail(&mut self, label: String, error: impl std::fmt::Display) {
        self.errors.push(EntityError {
            entity_id: label,
            error: error.to_string(),
        });
    }
}

/// Reconciles one upload batch against the entity's table.
///
/// Rows are processed independently; a failed row is recorded in the report
/// and never aborts its neighbors. Conflict resolution is last-write-wins
/// on `last_modified_at`, with the server winning exact ties. Append-only
/// entities skip any row whose key is already known, with no comparison at
/// all.
pub fn upload_batch<T>(
    store: &Store,
    rows: Vec<T>,
    user_id: Option<&str>,
    now: NaiveDateTime,
) -> ServerResult<BatchReport>
where
    T: SyncEntity,
    Store: HasTable<T>,
{
    let report = store.write(|txn: &mut TableTxn<'_, T>| {
        let mut report = BatchReport::default();
        for row in rows {
            reconcile_row(txn, row, user_id, now, &mut report);
        }
        Ok(report)
    })?;

    tracing::info!(
        entity = T::ENTITY,
        uploaded = report.uploaded,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.errors.len(),
        "upload batch reconciled"
    );
    Ok(report)
}

/// Reconciles SIM movement uploads, re-pointing the moved SIM in the same
/// transaction.
///
/// An accepted movement re-assigns the owning [`Sim`] row to the new shop
/// so clients downloading the SIM table see the move without replaying the
/// movement log. A movement naming an unknown SIM still reconciles; only
/// the re-pointing is skipped.
pub fn upload_sim_movements(
    store: &Store,
    rows: Vec<SimMovement>,
    user_id: Option<&str>,
    now: NaiveDateTime,
) -> ServerResult<BatchReport> {
    let report = store.write_pair(
        |movements: &mut TableTxn<'_, SimMovement>, sims: &mut TableTxn<'_, Sim>| {
            let mut report = BatchReport::default();
            for row in rows {
                let movement = row.clone();
                let applied_before = report.uploaded + report.updated;
                reconcile_row(movements, row, user_id, now, &mut report);
                let applied = report.uploaded + report.updated > applied_before;

                if applied {
                    if let Some(mut sim) = sims.get(&movement.sim_numero).cloned() {
                        sim.shop_id = movement.nouveau_shop_id;
                        sim.shop_designation = movement.nouveau_shop_designation.clone();
                        sim.meta.touch(now, movement.admin_responsable.as_deref());
                        if let Err(err) = sims.replace(&movement.sim_numero, sim) {
                            report.fail(movement.key_label(), err);
                        }
                    } else {
                        tracing::warn!(
                            sim = %movement.sim_numero,
                            "movement references an unknown SIM, re-pointing skipped"
                        );
                    }
                }
            }
            Ok(report)
        },
    )?;

    tracing::info!(
        entity = SimMovement::ENTITY,
        uploaded = report.uploaded,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.errors.len(),
        "sim movement batch reconciled"
    );
    Ok(report)
}

fn reconcile_row<T: SyncEntity>(
    txn: &mut TableTxn<'_, T>,
    mut row: T,
    user_id: Option<&str>,
    now: NaiveDateTime,
    report: &mut BatchReport,
) {
    let label = row.key_label();

    if let Err(err) = row.validate() {
        report.fail(label, err);
        return;
    }
    if row.meta().last_modified_by.is_none() {
        row.meta_mut().last_modified_by = user_id.map(String::from);
    }

    let existing = row.key().and_then(|key| txn.get(&key).cloned());
    match existing {
        Some(server) => {
            if T::APPEND_ONLY {
                report.skipped += 1;
                return;
            }
            // Last-write-wins; exact tie keeps the server version, which
            // makes re-uploading an already-applied batch a no-op.
            if row.meta().last_modified_at > server.meta().last_modified_at {
                if let Some(id) = server.id() {
                    row.set_id(id);
                }
                row.meta_mut().mark_synced(now);
                let key = match row.key() {
                    Some(key) => key,
                    None => {
                        report.fail(label, "row lost its key during reconciliation");
                        return;
                    }
                };
                match txn.replace(&key, row) {
                    Ok(()) => report.updated += 1,
                    Err(err) => report.fail(label, err),
                }
            } else {
                report.skipped += 1;
            }
        }
        None => {
            row.meta_mut().mark_synced(now);
            match txn.insert(row) {
                Ok(_) => report.uploaded += 1,
                Err(err) => report.fail(label, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::entity::{AuditEntry, VirtualTransaction};
    use shopsync_core::timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    fn transaction(reference: &str, modified: &str) -> VirtualTransaction {
        serde_json::from_value(serde_json::json!({
            "reference": reference,
            "montant_virtuel": 100.0,
            "montant_cash": 100.0,
            "sim_numero": "+243700000001",
            "shop_id": 1,
            "agent_id": 5,
            "last_modified_at": modified
        }))
        .unwrap()
    }

    #[test]
    fn new_rows_are_inserted_and_marked_synced() {
        let store = Store::new();
        let now = ts("2024-06-01 12:00:00");

        let report = upload_batch(
            &store,
            vec![transaction("VT-1", "2024-06-01 10:00:00")],
            Some("agent5"),
            now,
        )
        .unwrap();

        assert_eq!(report.uploaded, 1);
        let stored: VirtualTransaction = store.get(&"VT-1".to_string()).unwrap();
        assert!(stored.meta.is_synced);
        assert_eq!(stored.meta.synced_at, Some(now));
        assert_eq!(stored.meta.last_modified_by.as_deref(), Some("agent5"));
        // The client's own modification stamp survives.
        assert_eq!(stored.meta.last_modified_at, ts("2024-06-01 10:00:00"));
    }

    #[test]
    fn reupload_of_same_batch_is_a_noop() {
        let store = Store::new();
        let batch = vec![transaction("VT-1", "2024-06-01 10:00:00")];

        let first = upload_batch(&store, batch.clone(), None, ts("2024-06-01 12:00:00")).unwrap();
        let second = upload_batch(&store, batch, None, ts("2024-06-01 12:05:00")).unwrap();

        assert_eq!(first.uploaded, 1);
        assert_eq!(second.uploaded, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(store.stats().virtual_transactions, 1);
    }

    #[test]
    fn newer_client_version_wins() {
        let store = Store::new();
        upload_batch(
            &store,
            vec![transaction("VT-1", "2024-06-01 10:00:00")],
            None,
            ts("2024-06-01 12:00:00"),
        )
        .unwrap();

        let mut newer = transaction("VT-1", "2024-06-01 11:30:00");
        newer.montant_virtuel = 250.0;
        let report =
            upload_batch(&store, vec![newer], None, ts("2024-06-01 12:05:00")).unwrap();

        assert_eq!(report.updated, 1);
        let stored: VirtualTransaction = store.get(&"VT-1".to_string()).unwrap();
        assert_eq!(stored.montant_virtuel, 250.0);
    }

    #[test]
    fn older_client_version_is_skipped() {
        let store = Store::new();
        upload_batch(
            &store,
            vec![transaction("VT-1", "2024-06-01 10:00:00")],
            None,
            ts("2024-06-01 12:00:00"),
        )
        .unwrap();

        let mut stale = transaction("VT-1", "2024-06-01 09:00:00");
        stale.montant_virtuel = 1.0;
        let report =
            upload_batch(&store, vec![stale], None, ts("2024-06-01 12:05:00")).unwrap();

        assert_eq!(report.skipped, 1);
        let stored: VirtualTransaction = store.get(&"VT-1".to_string()).unwrap();
        assert_eq!(stored.montant_virtuel, 100.0);
    }

    #[test]
    fn server_id_survives_an_update() {
        let store = Store::new();
        upload_batch(
            &store,
            vec![transaction("VT-1", "2024-06-01 10:00:00")],
            None,
            ts("2024-06-01 12:00:00"),
        )
        .unwrap();
        let server_id = store
            .get::<VirtualTransaction>(&"VT-1".to_string())
            .unwrap()
            .id;

        let mut newer = transaction("VT-1", "2024-06-01 11:00:00");
        newer.id = Some(9999);
        upload_batch(&store, vec![newer], None, ts("2024-06-01 12:05:00")).unwrap();

        let stored: VirtualTransaction = store.get(&"VT-1".to_string()).unwrap();
        assert_eq!(stored.id, server_id);
    }

    #[test]
    fn bad_row_fails_alone() {
        let store = Store::new();
        let mut bad = transaction("VT-BAD", "2024-06-01 10:00:00");
        bad.montant_virtuel = -4.0;

        let report = upload_batch(
            &store,
            vec![bad, transaction("VT-2", "2024-06-01 10:00:00")],
            None,
            ts("2024-06-01 12:00:00"),
        )
        .unwrap();

        assert_eq!(report.uploaded, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].entity_id, "VT-BAD");
        assert!(store.get::<VirtualTransaction>(&"VT-2".to_string()).is_some());
        assert!(store.get::<VirtualTransaction>(&"VT-BAD".to_string()).is_none());
    }

    #[test]
    fn partial_failure_keeps_the_batch_successful() {
        let store = Store::new();
        let mut bad = transaction("VT-BAD", "2024-06-01 10:00:00");
        bad.montant_virtuel = -1.0;
        let batch = vec![transaction("VT-OK", "2024-06-01 10:00:00"), bad];

        let now = ts("2024-06-01 12:00:00");
        let response = upload_batch(&store, batch, None, now)
            .unwrap()
            .into_response(now);

        // One bad row is reported per-entity; the batch envelope stays
        // successful so clients do not re-send the accepted rows.
        assert!(response.success);
        assert_eq!(response.uploaded, 1);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].entity_id, "VT-BAD");
        assert_eq!(response.total, 2);
    }

    #[test]
    fn audit_rows_never_update() {
        let store = Store::new();
        let entry: AuditEntry = serde_json::from_value(serde_json::json!({
            "id": 7,
            "table_name": "sims",
            "record_id": "3",
            "action": "UPDATE",
            "created_at": "2024-06-01 10:00:00",
            "last_modified_at": "2024-06-01 10:00:00"
        }))
        .unwrap();

        let mut tampered = entry.clone();
        tampered.action = "DELETE".to_string();
        tampered.meta.last_modified_at = ts("2024-06-01 11:00:00");

        upload_batch(&store, vec![entry], None, ts("2024-06-01 12:00:00")).unwrap();
        let report =
            upload_batch(&store, vec![tampered], None, ts("2024-06-01 12:05:00")).unwrap();

        assert_eq!(report.skipped, 1);
        let stored: AuditEntry = store.get(&7).unwrap();
        assert_eq!(stored.action, "UPDATE");
    }

    #[test]
    fn movement_repoints_the_sim() {
        let store = Store::new();
        let sim: Sim = serde_json::from_value(serde_json::json!({
            "numero": "+243700000001",
            "operateur": "Vodacom",
            "shop_id": 1,
            "last_modified_at": "2024-06-01 08:00:00"
        }))
        .unwrap();
        upload_batch(&store, vec![sim], None, ts("2024-06-01 09:00:00")).unwrap();

        let movement: SimMovement = serde_json::from_value(serde_json::json!({
            "sim_numero": "+243700000001",
            "ancien_shop_id": 1,
            "nouveau_shop_id": 4,
            "nouveau_shop_designation": "Shop Limete",
            "admin_responsable": "admin1",
            "date_movement": "2024-06-02 10:00:00",
            "last_modified_at": "2024-06-02 10:00:00"
        }))
        .unwrap();
        let now = ts("2024-06-02 11:00:00");
        let report = upload_sim_movements(&store, vec![movement], None, now).unwrap();

        assert_eq!(report.uploaded, 1);
        let sim: Sim = store.get(&"+243700000001".to_string()).unwrap();
        assert_eq!(sim.shop_id, 4);
        assert_eq!(sim.shop_designation.as_deref(), Some("Shop Limete"));
        // The re-pointed SIM re-enters every client's change feed.
        assert!(!sim.meta.is_synced);
        assert_eq!(sim.meta.last_modified_at, now);
    }

    #[test]
    fn movement_for_unknown_sim_still_reconciles() {
        let store = Store::new();
        let movement: SimMovement = serde_json::from_value(serde_json::json!({
            "sim_numero": "+243799999999",
            "nouveau_shop_id": 4,
            "date_movement": "2024-06-02 10:00:00",
            "last_modified_at": "2024-06-02 10:00:00"
        }))
        .unwrap();

        let report =
            upload_sim_movements(&store, vec![movement], None, ts("2024-06-02 11:00:00"))
                .unwrap();

        assert_eq!(report.uploaded, 1);
        assert!(report.is_clean());
        assert_eq!(store.stats().sim_movements, 1);
    }
}
