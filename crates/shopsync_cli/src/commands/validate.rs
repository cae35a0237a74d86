//! Validate command implementation.

use super::dataset;
use shopsync_server::{server_now, SyncServer};
use std::path::Path;

/// Runs every batch in the dataset through a fresh reconciler and reports
/// per-entity outcomes. Fails when any row fails.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = dataset::read(path)?;
    let server = SyncServer::new();
    let responses = dataset::upload_all(&server, &data, server_now())?;

    let mut failed = 0usize;
    for (entity, response) in &responses {
        println!(
            "{entity}: {} rows ({} new, {} updated, {} skipped, {} failed)",
            response.total,
            response.uploaded,
            response.updated,
            response.skipped,
            response.errors.len()
        );
        for error in &response.errors {
            println!("  {}: {}", error.entity_id, error.error);
        }
        failed += response.errors.len();
    }

    if responses.is_empty() {
        println!("dataset is empty");
    }
    if failed > 0 {
        return Err(format!("{failed} row(s) failed validation").into());
    }
    println!("OK");
    Ok(())
}
