//! Client deposits.

use super::{validate_amount, validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A cash deposit made by a client onto a shop SIM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotClient {
    /// Server-assigned identity; also the natural key.
    #[serde(default)]
    pub id: Option<i64>,
    /// Shop that took the deposit.
    pub shop_id: i64,
    /// SIM credited.
    pub sim_numero: String,
    /// Deposited amount.
    pub montant: f64,
    /// Client phone number.
    pub telephone_client: String,
    /// When the deposit was taken.
    #[serde(with = "timestamp::wire")]
    pub date_depot: NaiveDateTime,
    /// Actor who recorded the deposit.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl SyncEntity for DepotClient {
    type Key = i64;

    const ENTITY: &'static str = "depot_clients";

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
            None => format!(
                "{}@{}",
                self.telephone_client,
                timestamp::format(self.date_depot)
            ),
        }
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_fk("shop_id", self.shop_id)?;
        validate_required("sim_numero", &self.sim_numero)?;
        validate_required("telephone_client", &self.telephone_client)?;
        validate_amount("montant", self.montant)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.shop_id)
    }
}
