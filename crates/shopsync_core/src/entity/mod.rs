//! Synchronized entity types, one per tracked back-office table.

mod audit;
mod cloture_caisse;
mod credit_virtuel;
mod currency_rate;
mod depot_client;
mod document_header;
mod operation;
mod sim;
mod sim_movement;
mod virtual_transaction;

pub use audit::AuditEntry;
pub use cloture_caisse::ClotureCaisse;
pub use credit_virtuel::CreditVirtuel;
pub use currency_rate::CurrencyRate;
pub use depot_client::DepotClient;
pub use document_header::DocumentHeader;
pub use operation::Operation;
pub use sim::Sim;
pub use sim_movement::SimMovement;
pub use virtual_transaction::VirtualTransaction;

use crate::error::CoreResult;
use crate::meta::SyncMeta;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// A row in one of the synchronized tables.
///
/// Every entity carries [`SyncMeta`] and exposes a *natural key*: the
/// business identifier used for idempotent upsert when the server-assigned
/// numeric id is not yet known to the client. Entities whose only key is
/// the numeric id return `None` from [`key`](SyncEntity::key) until the id
/// is assigned.
pub trait SyncEntity:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Natural key type (business reference, id, or composite key).
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    /// Table name, used for logging and per-entity configuration.
    const ENTITY: &'static str;

    /// Append-only entities are never updated once inserted; an upload of
    /// an already-known row is skipped instead of compared by timestamp.
    const APPEND_ONLY: bool = false;

    /// Server-assigned numeric identity, stable once assigned.
    fn id(&self) -> Option<i64>;

    /// Assigns the server identity (called by the store on insert).
    fn set_id(&mut self, id: i64);

    /// Natural key, if resolvable for this row.
    fn key(&self) -> Option<Self::Key>;

    /// Human-readable key for per-entity upload results and logs.
    fn key_label(&self) -> String;

    /// Sync metadata.
    fn meta(&self) -> &SyncMeta;

    /// Mutable sync metadata.
    fn meta_mut(&mut self) -> &mut SyncMeta;

    /// Checks required fields and numeric sanity.
    ///
    /// A failure here never aborts an upload batch; it is reported as a
    /// per-entity error.
    fn validate(&self) -> CoreResult<()>;

    /// Scope filter: owning shop, for entities with a tenant boundary.
    fn shop_id(&self) -> Option<i64> {
        None
    }

    /// Business timeline timestamp, when the entity has one.
    ///
    /// The change feed orders by this first (descending) and by
    /// `last_modified_at` second, so the most recent business-relevant
    /// record comes out on top.
    fn business_timestamp(&self) -> Option<NaiveDateTime> {
        None
    }
}

/// Validates that a monetary amount is a finite, non-negative number.
pub(crate) fn validate_amount(field: &'static str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(crate::error::CoreError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Validates that a required string field is present and non-empty.
pub(crate) fn validate_required(field: &'static str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(crate::error::CoreError::validation(format!(
            "{field} is required"
        )));
    }
    Ok(())
}

/// Validates that a foreign id is a positive integer.
pub(crate) fn validate_fk(field: &'static str, value: i64) -> CoreResult<()> {
    if value <= 0 {
        return Err(crate::error::CoreError::validation(format!(
            "{field} must be a positive id"
        )));
    }
    Ok(())
}
