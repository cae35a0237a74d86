//! Virtual credit extended to beneficiaries.

use super::{validate_amount, validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Virtual float lent out of a SIM to a beneficiary, repaid later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditVirtuel {
    /// Server-assigned identity.
    #[serde(default)]
    pub id: Option<i64>,
    /// Business reference; natural key.
    pub reference: String,
    /// Amount of credit extended.
    pub montant_credit: f64,
    /// Currency code.
    #[serde(default = "default_devise")]
    pub devise: String,
    /// Beneficiary name.
    pub beneficiaire_nom: String,
    /// Beneficiary phone.
    #[serde(default)]
    pub beneficiaire_telephone: Option<String>,
    /// Beneficiary address.
    #[serde(default)]
    pub beneficiaire_adresse: Option<String>,
    /// Beneficiary category ("client", "partenaire", ...).
    #[serde(default)]
    pub type_beneficiaire: Option<String>,
    /// SIM the float left from.
    pub sim_numero: String,
    /// Shop that granted the credit.
    pub shop_id: i64,
    /// Denormalized shop name.
    #[serde(default)]
    pub shop_designation: Option<String>,
    /// Agent who granted the credit.
    pub agent_id: i64,
    /// Denormalized agent username.
    #[serde(default)]
    pub agent_username: Option<String>,
    /// Repayment status.
    #[serde(default = "default_statut")]
    pub statut: String,
    /// When the float left the SIM.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_sortie: Option<NaiveDateTime>,
    /// When the credit was repaid, if repaid.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_paiement: Option<NaiveDateTime>,
    /// Agreed repayment deadline.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_echeance: Option<NaiveDateTime>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Amount repaid so far.
    #[serde(default)]
    pub montant_paye: f64,
    /// Repayment mode.
    #[serde(default)]
    pub mode_paiement: Option<String>,
    /// Repayment reference.
    #[serde(default)]
    pub reference_paiement: Option<String>,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

fn default_devise() -> String {
    "USD".to_string()
}

fn default_statut() -> String {
    "enCours".to_string()
}

impl SyncEntity for CreditVirtuel {
    type Key = String;

    const ENTITY: &'static str = "credit_virtuel";

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
        validate_required("beneficiaire_nom", &self.beneficiaire_nom)?;
        validate_required("sim_numero", &self.sim_numero)?;
        validate_fk("shop_id", self.shop_id)?;
        validate_fk("agent_id", self.agent_id)?;
        validate_amount("montant_credit", self.montant_credit)?;
        validate_amount("montant_paye", self.montant_paye)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.shop_id)
    }
}
