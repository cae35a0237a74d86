//! SIM transfers between shops.

use super::{validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A SIM being moved from one shop to another by an administrator.
///
/// Applying a movement also re-points the owning [`Sim`](super::Sim) row at
/// the new shop; the upload reconciler performs both writes in the same
/// transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimMovement {
    /// Server-assigned identity; also the natural key.
    #[serde(default)]
    pub id: Option<i64>,
    /// Server id of the moved SIM, if known client-side.
    #[serde(default)]
    pub sim_id: Option<i64>,
    /// Phone number of the moved SIM.
    pub sim_numero: String,
    /// Shop the SIM left.
    #[serde(default)]
    pub ancien_shop_id: Option<i64>,
    /// Denormalized old shop name.
    #[serde(default)]
    pub ancien_shop_designation: Option<String>,
    /// Shop the SIM joined.
    pub nouveau_shop_id: i64,
    /// Denormalized new shop name.
    #[serde(default)]
    pub nouveau_shop_designation: Option<String>,
    /// Administrator who decided the move.
    #[serde(default)]
    pub admin_responsable: Option<String>,
    /// Reason for the move.
    #[serde(default)]
    pub motif: Option<String>,
    /// When the move happened.
    #[serde(with = "timestamp::wire")]
    pub date_movement: NaiveDateTime,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl SyncEntity for SimMovement {
    type Key = i64;

    const ENTITY: &'static str = "sim_movements";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn key_label(&self) -> String {
        match self.id {
            Some(id) => format!("{id}"),
            None => format!("{}@{}", self.sim_numero, timestamp::format(self.date_movement)),
        }
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_required("sim_numero", &self.sim_numero)?;
        validate_fk("nouveau_shop_id", self.nouveau_shop_id)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.nouveau_shop_id)
    }

    fn business_timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.date_movement)
    }
}
