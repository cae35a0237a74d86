//! Core data model for the shop synchronization server.
//!
//! This crate defines the synchronized entities of the back office (SIMs,
//! virtual transactions, operations, cash closures, ...), the sync metadata
//! every row carries, and the in-memory [`Store`] that holds one table per
//! entity with transactional write access.
//!
//! Everything here is transport-agnostic: the change feed, the upload
//! reconciler, and the corbeille lifecycle live in `shopsync_server` and
//! are built entirely on the primitives of this crate.
//!
//! # Example
//!
//! ```
//! use shopsync_core::{Store, TableTxn};
//! use shopsync_core::entity::VirtualTransaction;
//!
//! let store = Store::new();
//! let row: VirtualTransaction = serde_json::from_value(serde_json::json!({
//!     "reference": "VT-2024-001",
//!     "montant_virtuel": 150.0,
//!     "montant_cash": 150.0,
//!     "sim_numero": "+243812345678",
//!     "shop_id": 3,
//!     "agent_id": 12,
//!     "last_modified_at": "2024-03-01 09:30:00"
//! }))?;
//!
//! store.write(|txn: &mut TableTxn<'_, VirtualTransaction>| txn.insert(row))?;
//! assert_eq!(store.stats().virtual_transactions, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod corbeille;
pub mod entity;
pub mod error;
pub mod meta;
pub mod store;
pub mod table;
pub mod timestamp;

pub use corbeille::CorbeilleRecord;
pub use error::{CoreError, CoreResult};
pub use meta::SyncMeta;
pub use store::{HasTable, Store, StoreStats};
pub use table::{Table, TableTxn};
