//! Synchronization server for the shop back office.
//!
//! This crate implements the server half of the offline-first sync
//! protocol:
//!
//! - [`feed`]: change feed downloads driven by a client-owned timestamp
//!   cursor
//! - [`reconciler`]: upload batches reconciled row by row with
//!   last-write-wins conflict resolution
//! - [`corbeille`]: the soft-delete and restore lifecycle for virtual
//!   transactions
//! - [`audit`]: append-only audit log writes
//!
//! [`SyncServer`] ties these together over a single
//! [`Store`](shopsync_core::Store) and is what an HTTP transport embeds.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod config;
pub mod corbeille;
pub mod error;
pub mod feed;
pub mod reconciler;
pub mod server;

pub use audit::AuditRecorder;
pub use config::ServerConfig;
pub use corbeille::CorbeilleManager;
pub use error::{ServerError, ServerResult};
pub use feed::query_changes;
pub use reconciler::{upload_batch, upload_sim_movements, BatchReport};
pub use server::{server_now, SyncServer};
