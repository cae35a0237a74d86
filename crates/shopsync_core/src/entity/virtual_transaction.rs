//! Virtual money transactions (float sold against cash).

use super::{validate_amount, validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A virtual-money transaction recorded by an agent.
///
/// Keyed by the client-generated `reference`; this is the entity the
/// corbeille (soft-delete/restore) lifecycle applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualTransaction {
    /// Server-assigned identity.
    #[serde(default)]
    pub id: Option<i64>,
    /// Client-generated business reference; natural key.
    pub reference: String,
    /// Virtual amount moved on the SIM.
    pub montant_virtuel: f64,
    /// Transaction fees.
    #[serde(default)]
    pub frais: f64,
    /// Cash countervalue.
    pub montant_cash: f64,
    /// Currency code.
    #[serde(default = "default_devise")]
    pub devise: String,
    /// SIM used for the transaction.
    pub sim_numero: String,
    /// Shop where the transaction happened.
    pub shop_id: i64,
    /// Denormalized shop name for offline display.
    #[serde(default)]
    pub shop_designation: Option<String>,
    /// Agent who recorded the transaction.
    pub agent_id: i64,
    /// Denormalized agent username.
    #[serde(default)]
    pub agent_username: Option<String>,
    /// Client name, if captured.
    #[serde(default)]
    pub client_nom: Option<String>,
    /// Client phone, if captured.
    #[serde(default)]
    pub client_telephone: Option<String>,
    /// Workflow status ("enAttente", "validee", ...).
    #[serde(default = "default_statut")]
    pub statut: String,
    /// When the agent recorded the transaction.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_enregistrement: Option<NaiveDateTime>,
    /// When a supervisor validated it, if validated.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_validation: Option<NaiveDateTime>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Administrative adjustment rather than a client-facing sale.
    #[serde(default)]
    pub is_administrative: bool,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

fn default_devise() -> String {
    "USD".to_string()
}

fn default_statut() -> String {
    "enAttente".to_string()
}

impl SyncEntity for VirtualTransaction {
    type Key = String;

    const ENTITY: &'static str = "virtual_transactions";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key(&self) -> Option<String> {
        Some(self.reference.clone())
    }

    fn key_label(&self) -> String {
        self.reference.clone()
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_required("reference", &self.reference)?;
        validate_required("sim_numero", &self.sim_numero)?;
        validate_fk("shop_id", self.shop_id)?;
        validate_fk("agent_id", self.agent_id)?;
        validate_amount("montant_virtuel", self.montant_virtuel)?;
        validate_amount("montant_cash", self.montant_cash)?;
        validate_amount("frais", self.frais)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.shop_id)
    }
}
