//! Feed command implementation.

use super::dataset;
use shopsync_core::entity::{
    AuditEntry, ClotureCaisse, CreditVirtuel, CurrencyRate, DepotClient, DocumentHeader,
    Operation, Sim, SimMovement, SyncEntity, VirtualTransaction,
};
use shopsync_core::{CorbeilleRecord, HasTable, Store};
use shopsync_protocol::ChangesQuery;
use shopsync_server::{server_now, SyncServer};
use std::path::Path;

/// Loads the dataset and prints one change feed page for `entity` as JSON.
pub fn run(
    path: &Path,
    entity: &str,
    since: Option<&str>,
    shop_id: Option<i64>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset::read(path)?;
    let server = SyncServer::new();
    let loaded = dataset::upload_all(&server, &data, server_now())?;
    let failed: usize = loaded.iter().map(|(_, r)| r.errors.len()).sum();
    if failed > 0 {
        return Err(format!("{failed} dataset row(s) failed to load").into());
    }

    let query = ChangesQuery {
        since: since.map(String::from),
        shop_id,
        limit,
    };

    fn page<T>(
        server: &SyncServer,
        query: &ChangesQuery,
    ) -> Result<String, Box<dyn std::error::Error>>
    where
        T: SyncEntity,
        Store: HasTable<T>,
    {
        let page = server.handle_changes::<T>(query, server_now())?;
        Ok(serde_json::to_string_pretty(&page)?)
    }

    let output = match entity {
        "sims" => page::<Sim>(&server, &query)?,
        "sim_movements" => page::<SimMovement>(&server, &query)?,
        "virtual_transactions" => page::<VirtualTransaction>(&server, &query)?,
        "virtual_transactions_corbeille" => page::<CorbeilleRecord>(&server, &query)?,
        "operations" => page::<Operation>(&server, &query)?,
        "credit_virtuel" => page::<CreditVirtuel>(&server, &query)?,
        "cloture_caisse" => page::<ClotureCaisse>(&server, &query)?,
        "currency_rates" => page::<CurrencyRate>(&server, &query)?,
        "document_headers" => page::<DocumentHeader>(&server, &query)?,
        "depot_clients" => page::<DepotClient>(&server, &query)?,
        "audit_log" => page::<AuditEntry>(&server, &query)?,
        other => {
            return Err(format!(
                "unknown entity: {other} (expected one of {})",
                dataset::ENTITIES.join(", ")
            )
            .into())
        }
    };

    println!("{output}");
    Ok(())
}
