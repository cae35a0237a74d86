//! Dataset files: JSON snapshots of per-entity upload batches.
//!
//! A dataset is one JSON object keyed by entity name, each value an array
//! of rows in the wire shape:
//!
//! ```json
//! {
//!   "sims": [{ "numero": "+243812345678", ... }],
//!   "virtual_transactions": [{ "reference": "VT-2024-001", ... }]
//! }
//! ```

use chrono::NaiveDateTime;
use serde_json::Value;
use shopsync_core::entity::{
    AuditEntry, ClotureCaisse, CreditVirtuel, CurrencyRate, DepotClient, DocumentHeader,
    Operation, Sim, SyncEntity,
};
use shopsync_core::CorbeilleRecord;
use shopsync_protocol::{UploadRequest, UploadResponse};
use shopsync_server::SyncServer;
use std::path::Path;

/// Entity names a dataset may carry, in load order.
///
/// SIMs load before movements so movement re-pointing finds its SIM.
pub const ENTITIES: &[&str] = &[
    Sim::ENTITY,
    "sim_movements",
    "virtual_transactions",
    CorbeilleRecord::ENTITY,
    Operation::ENTITY,
    CreditVirtuel::ENTITY,
    ClotureCaisse::ENTITY,
    CurrencyRate::ENTITY,
    DocumentHeader::ENTITY,
    DepotClient::ENTITY,
    AuditEntry::ENTITY,
];

/// Reads and parses a dataset file.
pub fn read(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|err| format!("{} is not valid JSON: {err}", path.display()))?;
    if !value.is_object() {
        return Err(format!("{} must be a JSON object keyed by entity", path.display()).into());
    }
    Ok(value)
}

/// Uploads every batch in the dataset into `server`, returning one
/// response per entity present.
pub fn upload_all(
    server: &SyncServer,
    dataset: &Value,
    now: NaiveDateTime,
) -> Result<Vec<(String, UploadResponse)>, Box<dyn std::error::Error>> {
    if let Some(map) = dataset.as_object() {
        for key in map.keys() {
            if !ENTITIES.contains(&key.as_str()) {
                return Err(format!("unknown entity in dataset: {key}").into());
            }
        }
    }

    let mut responses = Vec::new();
    for entity in ENTITIES {
        let Some(rows) = dataset.get(entity) else {
            continue;
        };
        let response = upload_entity(server, entity, rows.clone(), now)?;
        responses.push((entity.to_string(), response));
    }
    Ok(responses)
}

fn upload_entity(
    server: &SyncServer,
    entity: &str,
    rows: Value,
    now: NaiveDateTime,
) -> Result<UploadResponse, Box<dyn std::error::Error>> {
    fn request<T: SyncEntity>(rows: Value) -> Result<UploadRequest<T>, Box<dyn std::error::Error>> {
        let entities: Vec<T> = serde_json::from_value(rows)?;
        Ok(UploadRequest::new(entities))
    }

    let response = match entity {
        "sims" => server.handle_upload(request::<Sim>(rows)?, now)?,
        "sim_movements" => server.handle_sim_movement_upload(request(rows)?, now)?,
        "virtual_transactions" => {
            server.handle_upload(request::<shopsync_core::entity::VirtualTransaction>(rows)?, now)?
        }
        "virtual_transactions_corbeille" => {
            server.handle_upload(request::<CorbeilleRecord>(rows)?, now)?
        }
        "operations" => server.handle_upload(request::<Operation>(rows)?, now)?,
        "credit_virtuel" => server.handle_upload(request::<CreditVirtuel>(rows)?, now)?,
        "cloture_caisse" => server.handle_upload(request::<ClotureCaisse>(rows)?, now)?,
        "currency_rates" => server.handle_upload(request::<CurrencyRate>(rows)?, now)?,
        "document_headers" => server.handle_upload(request::<DocumentHeader>(rows)?, now)?,
        "depot_clients" => server.handle_upload(request::<DepotClient>(rows)?, now)?,
        "audit_log" => server.handle_audit_upload(request(rows)?, now)?,
        other => return Err(format!("unknown entity: {other}").into()),
    };
    Ok(response)
}
