//! Money-transfer operations between shops.

use super::{validate_amount, validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A transfer operation (send/receive) between a source and an optional
/// destination shop, keyed by its business `reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Server-assigned identity.
    #[serde(default)]
    pub id: Option<i64>,
    /// Business reference; natural key.
    pub reference: String,
    /// Operation type ("envoi", "retrait", ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Gross amount handed over by the client.
    pub montant_brut: f64,
    /// Net amount after commission.
    #[serde(default)]
    pub montant_net: f64,
    /// Commission taken.
    #[serde(default)]
    pub commission: f64,
    /// Currency code.
    #[serde(default = "default_devise")]
    pub devise: String,
    /// Sending client id, if registered.
    #[serde(default)]
    pub client_id: Option<i64>,
    /// Sending client name.
    #[serde(default)]
    pub client_nom: Option<String>,
    /// Shop where the operation originated.
    pub shop_source_id: i64,
    /// Denormalized source shop name.
    #[serde(default)]
    pub shop_source_designation: Option<String>,
    /// Destination shop for transfers.
    #[serde(default)]
    pub shop_destination_id: Option<i64>,
    /// Denormalized destination shop name.
    #[serde(default)]
    pub shop_destination_designation: Option<String>,
    /// Agent who recorded the operation.
    pub agent_id: i64,
    /// Denormalized agent username.
    #[serde(default)]
    pub agent_username: Option<String>,
    /// Payment mode ("cash", "virtuel", ...).
    #[serde(default)]
    pub mode_paiement: Option<String>,
    /// Workflow status.
    #[serde(default = "default_statut")]
    pub statut: String,
    /// Validation timestamp, once validated at the destination.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_validation: Option<NaiveDateTime>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Recipient name for transfers.
    #[serde(default)]
    pub destinataire: Option<String>,
    /// Recipient phone.
    #[serde(default)]
    pub telephone_destinataire: Option<String>,
    /// Withdrawal code communicated to the recipient.
    #[serde(default)]
    pub code_ops: Option<String>,
    /// Row creation timestamp.
    #[serde(default, with = "timestamp::wire_opt")]
    pub created_at: Option<NaiveDateTime>,
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

impl SyncEntity for Operation {
    type Key = String;

    const ENTITY: &'static str = "operations";

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
        validate_required("type", &self.kind)?;
        validate_fk("shop_source_id", self.shop_source_id)?;
        validate_fk("agent_id", self.agent_id)?;
        validate_amount("montant_brut", self.montant_brut)?;
        validate_amount("montant_net", self.montant_net)?;
        validate_amount("commission", self.commission)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.shop_source_id)
    }
}
