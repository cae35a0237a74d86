//! Inspect command implementation.

use super::dataset;
use shopsync_server::{server_now, SyncServer};
use std::path::Path;

/// Loads the dataset and prints per-table row counts.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset::read(path)?;
    let server = SyncServer::new();
    dataset::upload_all(&server, &data, server_now())?;

    let stats = server.stats();
    println!("dataset: {}", path.display());
    println!("  sims:                           {}", stats.sims);
    println!("  sim_movements:                  {}", stats.sim_movements);
    println!("  virtual_transactions:           {}", stats.virtual_transactions);
    println!(
        "  virtual_transactions_corbeille: {}",
        stats.virtual_transactions_corbeille
    );
    println!("  operations:                     {}", stats.operations);
    println!("  credit_virtuel:                 {}", stats.credits_virtuels);
    println!("  cloture_caisse:                 {}", stats.clotures_caisse);
    println!("  currency_rates:                 {}", stats.currency_rates);
    println!("  document_headers:               {}", stats.document_headers);
    println!("  depot_clients:                  {}", stats.depot_clients);
    println!("  audit_log:                      {}", stats.audit_log);
    println!("  total:                          {}", stats.total());
    Ok(())
}
