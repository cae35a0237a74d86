//! Synchronization metadata carried by every tracked row.

use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sync metadata embedded (serde-flattened) in every synchronized entity.
///
/// `last_modified_at` is the sole change-feed cursor field and must never
/// move backward for a given row; the store stamps it on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMeta {
    /// Timestamp of the last mutation; change-feed cursor.
    #[serde(with = "timestamp::wire")]
    pub last_modified_at: NaiveDateTime,
    /// Actor (agent or shop username) who performed the last mutation.
    #[serde(default)]
    pub last_modified_by: Option<String>,
    /// Whether the row has reached a steady state with at least one client.
    #[serde(default)]
    pub is_synced: bool,
    /// When the row was last confirmed by an upload-driven write.
    #[serde(default, with = "timestamp::wire_opt")]
    pub synced_at: Option<NaiveDateTime>,
}

impl SyncMeta {
    /// Creates fresh metadata for a row modified at `now` by `actor`.
    pub fn new(now: NaiveDateTime, actor: Option<&str>) -> Self {
        Self {
            last_modified_at: now,
            last_modified_by: actor.map(String::from),
            is_synced: false,
            synced_at: None,
        }
    }

    /// Stamps an upload-driven write: marks the row synced at `now`.
    ///
    /// `last_modified_at` keeps the client-submitted value so the
    /// last-write-wins comparison stays meaningful across devices; only
    /// the sync confirmation fields take the server clock.
    pub fn mark_synced(&mut self, now: NaiveDateTime) {
        self.is_synced = true;
        self.synced_at = Some(now);
    }

    /// Stamps a server-side mutation: advances the cursor and resets the
    /// synced flag so the row re-enters every client's change feed.
    pub fn touch(&mut self, now: NaiveDateTime, actor: Option<&str>) {
        // Cursor monotonicity: never move last_modified_at backward.
        if now > self.last_modified_at {
            self.last_modified_at = now;
        }
        self.last_modified_by = actor.map(String::from);
        self.is_synced = false;
        self.synced_at = None;
    }
}
