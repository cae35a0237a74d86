//! The synchronization server facade.

use crate::audit::AuditRecorder;
use crate::config::ServerConfig;
use crate::corbeille::CorbeilleManager;
use crate::error::{ServerError, ServerResult};
use crate::feed::query_changes;
use crate::reconciler::{upload_batch, upload_sim_movements};
use chrono::NaiveDateTime;
use shopsync_core::entity::{AuditEntry, SimMovement, SyncEntity};
use shopsync_core::{timestamp, CorbeilleRecord, HasTable, Store, StoreStats};
use shopsync_protocol::{
    ChangesQuery, ChangesResponse, CorbeilleQuery, DeleteRequest, DeleteResponse, ErrorResponse,
    RestoreRequest, RestoreResponse, UploadRequest, UploadResponse,
};

/// One synchronization endpoint set over one [`Store`].
///
/// The facade is transport-agnostic: every handler takes the parsed request
/// and the server clock (`now`) and returns the wire response, leaving
/// HTTP framing to the embedding process. All handlers take `&self`; the
/// store serializes writers per table underneath.
#[derive(Debug, Default)]
pub struct SyncServer {
    store: Store,
    config: ServerConfig,
}

impl SyncServer {
    /// Creates a server with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Creates a server with an explicit configuration.
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            store: Store::new(),
            config,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Row counts per table.
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Serves one change feed page for any synchronized entity.
    ///
    /// The echoed `timestamp` is the client's next cursor; because cursor
    /// filtering is strict, advancing to it never re-delivers this page and
    /// never skips a row stamped after it.
    pub fn handle_changes<T>(
        &self,
        query: &ChangesQuery,
        now: NaiveDateTime,
    ) -> ServerResult<ChangesResponse<T>>
    where
        T: SyncEntity,
        Store: HasTable<T>,
    {
        let cap = if T::ENTITY == AuditEntry::ENTITY {
            self.config.audit_page_limit
        } else {
            self.config.page_limit
        };
        let limit = self.config.effective_limit(query.limit, cap);
        let rows = query_changes::<T>(&self.store, query, limit)?;
        Ok(ChangesResponse::new(rows, query.since.clone(), now))
    }

    /// Reconciles one upload batch for any synchronized entity.
    pub fn handle_upload<T>(
        &self,
        request: UploadRequest<T>,
        now: NaiveDateTime,
    ) -> ServerResult<UploadResponse>
    where
        T: SyncEntity,
        Store: HasTable<T>,
    {
        self.check_batch_size(request.entities.len())?;
        let report = upload_batch(
            &self.store,
            request.entities,
            request.user_id.as_deref(),
            now,
        )?;
        Ok(report.into_response(now))
    }

    /// Reconciles SIM movement uploads, re-pointing moved SIMs.
    pub fn handle_sim_movement_upload(
        &self,
        request: UploadRequest<SimMovement>,
        now: NaiveDateTime,
    ) -> ServerResult<UploadResponse> {
        self.check_batch_size(request.entities.len())?;
        let report = upload_sim_movements(
            &self.store,
            request.entities,
            request.user_id.as_deref(),
            now,
        )?;
        Ok(report.into_response(now))
    }

    /// Reconciles audit log uploads; actions are canonicalized first.
    pub fn handle_audit_upload(
        &self,
        mut request: UploadRequest<AuditEntry>,
        now: NaiveDateTime,
    ) -> ServerResult<UploadResponse> {
        for entry in &mut request.entities {
            entry.normalize_action();
        }
        self.handle_upload(request, now)
    }

    /// Soft-deletes a virtual transaction into the corbeille.
    pub fn handle_delete(
        &self,
        request: &DeleteRequest,
        now: NaiveDateTime,
    ) -> ServerResult<DeleteResponse> {
        let record = CorbeilleManager::delete(&self.store, request, now)?;
        Ok(DeleteResponse {
            success: true,
            message: format!("{} moved to corbeille", record.transaction.reference),
            reference: record.transaction.reference,
            deleted_at: record.deletion_date,
        })
    }

    /// Restores a corbeille row into the active table.
    pub fn handle_restore(
        &self,
        request: &RestoreRequest,
        now: NaiveDateTime,
    ) -> ServerResult<RestoreResponse> {
        let restored = CorbeilleManager::restore(&self.store, request, now)?;
        Ok(RestoreResponse {
            success: true,
            message: format!("{} restored", restored.reference),
            reference: restored.reference,
            restored_by: request.restored_by.clone(),
            restored_at: now,
        })
    }

    /// Lists corbeille rows, pending-only by default.
    pub fn handle_corbeille_list(
        &self,
        query: &CorbeilleQuery,
        now: NaiveDateTime,
    ) -> ChangesResponse<CorbeilleRecord> {
        let rows = CorbeilleManager::list(&self.store, query);
        ChangesResponse::new(rows, None, now)
    }

    /// Appends a server-observed audit entry.
    pub fn record_audit(&self, entry: AuditEntry) -> ServerResult<i64> {
        AuditRecorder::record(&self.store, entry)
    }

    /// Builds the wire envelope for a failed request.
    pub fn error_response(&self, err: &ServerError, now: NaiveDateTime) -> ErrorResponse {
        if err.is_server_error() {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::warn!(error = %err, "request rejected");
        }
        ErrorResponse::new(err.class(), &err.to_string(), now)
    }

    fn check_batch_size(&self, len: usize) -> ServerResult<()> {
        if len > self.config.max_upload_batch {
            return Err(ServerError::invalid(format!(
                "batch of {len} exceeds the {} row limit",
                self.config.max_upload_batch
            )));
        }
        Ok(())
    }
}

/// Current server time in the wire resolution (whole seconds).
///
/// Stamps produced here always round-trip through the wire format
/// unchanged.
pub fn server_now() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    timestamp::parse(&timestamp::format(now)).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::entity::VirtualTransaction;
    use shopsync_core::timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    fn transaction(reference: &str, modified: &str) -> VirtualTransaction {
        serde_json::from_value(serde_json::json!({
            "reference": reference,
            "montant_virtuel": 20.0,
            "montant_cash": 20.0,
            "sim_numero": "+243700000001",
            "shop_id": 1,
            "agent_id": 3,
            "last_modified_at": modified
        }))
        .unwrap()
    }

    #[test]
    fn oversized_batch_is_rejected_whole() {
        let server = SyncServer::with_config(ServerConfig::default().with_max_upload_batch(1));
        let batch = UploadRequest::new(vec![
            transaction("VT-1", "2024-06-01 10:00:00"),
            transaction("VT-2", "2024-06-01 10:00:00"),
        ]);

        let err = server
            .handle_upload(batch, ts("2024-06-01 12:00:00"))
            .unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(server.stats().virtual_transactions, 0);
    }

    #[test]
    fn audit_feed_uses_the_tighter_cap() {
        let server =
            SyncServer::with_config(ServerConfig::default().with_audit_page_limit(2));

        let entries: Vec<AuditEntry> = (0..4)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "table_name": "sims",
                    "record_id": format!("{i}"),
                    "action": "UPDATE",
                    "created_at": format!("2024-06-01 10:0{i}:00"),
                    "last_modified_at": format!("2024-06-01 10:0{i}:00")
                }))
                .unwrap()
            })
            .collect();
        server
            .handle_upload(UploadRequest::new(entries), ts("2024-06-01 11:00:00"))
            .unwrap();

        let page: ChangesResponse<AuditEntry> = server
            .handle_changes(&ChangesQuery::full(), ts("2024-06-01 12:00:00"))
            .unwrap();
        assert_eq!(page.count, 2);
        // Newest first.
        assert_eq!(page.entities[0].record_id, "3");
    }

    #[test]
    fn error_envelope_carries_the_class() {
        let server = SyncServer::new();
        let err = ServerError::not_found("sims", "+243");

        let envelope = server.error_response(&err, ts("2024-06-01 12:00:00"));
        assert!(!envelope.success);
        assert_eq!(envelope.error, "not_found");
        assert!(envelope.message.contains("+243"));
    }

    #[test]
    fn server_now_round_trips_through_the_wire_format() {
        let now = server_now();
        let parsed = timestamp::parse(&timestamp::format(now)).unwrap();
        assert_eq!(parsed, now);
    }
}
