//! SIM cards held by shops.

use super::{validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A SIM card assigned to a shop, carrying an operator float balance.
///
/// The natural key is the phone number (`numero`); clients create SIMs
/// offline and upload them before any server id exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sim {
    /// Server-assigned identity.
    #[serde(default)]
    pub id: Option<i64>,
    /// Phone number; natural key.
    pub numero: String,
    /// Mobile network operator (e.g. "Vodacom", "Airtel").
    pub operateur: String,
    /// Owning shop.
    pub shop_id: i64,
    /// Denormalized shop name for offline display.
    #[serde(default)]
    pub shop_designation: Option<String>,
    /// Balance when the SIM was registered.
    #[serde(default)]
    pub solde_initial: f64,
    /// Current float balance.
    #[serde(default)]
    pub solde_actuel: f64,
    /// Status ("active", "suspendue", ...).
    #[serde(default = "default_statut")]
    pub statut: String,
    /// Reason for suspension, if suspended.
    #[serde(default)]
    pub motif_suspension: Option<String>,
    /// Registration date.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_creation: Option<NaiveDateTime>,
    /// Suspension date, if suspended.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_suspension: Option<NaiveDateTime>,
    /// Actor who registered the SIM.
    #[serde(default)]
    pub cree_par: Option<String>,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

fn default_statut() -> String {
    "active".to_string()
}

impl SyncEntity for Sim {
    type Key = String;

    const ENTITY: &'static str = "sims";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key(&self) -> Option<String> {
        Some(self.numero.clone())
    }

    fn key_label(&self) -> String {
        self.numero.clone()
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_required("numero", &self.numero)?;
        validate_required("operateur", &self.operateur)?;
        validate_fk("shop_id", self.shop_id)?;
        super::validate_amount("solde_initial", self.solde_initial)?;
        super::validate_amount("solde_actuel", self.solde_actuel)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.shop_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sim {
        serde_json::from_value(serde_json::json!({
            "numero": "+243700000001",
            "operateur": "Vodacom",
            "shop_id": 1,
            "solde_actuel": 1500.0,
            "last_modified_at": "2024-01-01 10:00:00"
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_with_defaults() {
        let sim = sample();
        assert_eq!(sim.statut, "active");
        assert_eq!(sim.solde_initial, 0.0);
        assert!(!sim.meta.is_synced);
    }

    #[test]
    fn validation_catches_missing_operator() {
        let mut sim = sample();
        sim.operateur = String::new();
        assert!(sim.validate().is_err());
    }

    #[test]
    fn negative_balance_rejected() {
        let mut sim = sample();
        sim.solde_actuel = -5.0;
        assert!(sim.validate().is_err());
    }
}
