//! Daily cash-desk closures.

use super::{validate_fk, validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// End-of-day closure of a shop's cash desk: counted balances per payment
/// channel against computed balances, and the resulting gaps.
///
/// Natural key is the composite `(shop_id, date_cloture)` — one closure per
/// shop per business day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClotureCaisse {
    /// Server-assigned identity.
    #[serde(default)]
    pub id: Option<i64>,
    /// Shop being closed.
    pub shop_id: i64,
    /// Business day of the closure.
    #[serde(with = "timestamp::wire_date")]
    pub date_cloture: NaiveDate,
    /// Fee balance carried over from the previous closure.
    #[serde(default)]
    pub solde_frais_anterieur: f64,
    /// Counted cash balance.
    #[serde(default)]
    pub solde_saisi_cash: f64,
    /// Counted Airtel Money balance.
    #[serde(default)]
    pub solde_saisi_airtel_money: f64,
    /// Counted M-Pesa balance.
    #[serde(default)]
    pub solde_saisi_mpesa: f64,
    /// Counted Orange Money balance.
    #[serde(default)]
    pub solde_saisi_orange_money: f64,
    /// Counted total.
    #[serde(default)]
    pub solde_saisi_total: f64,
    /// Computed cash balance.
    #[serde(default)]
    pub solde_calcule_cash: f64,
    /// Computed Airtel Money balance.
    #[serde(default)]
    pub solde_calcule_airtel_money: f64,
    /// Computed M-Pesa balance.
    #[serde(default)]
    pub solde_calcule_mpesa: f64,
    /// Computed Orange Money balance.
    #[serde(default)]
    pub solde_calcule_orange_money: f64,
    /// Computed total.
    #[serde(default)]
    pub solde_calcule_total: f64,
    /// Cash gap (counted minus computed).
    #[serde(default)]
    pub ecart_cash: f64,
    /// Airtel Money gap.
    #[serde(default)]
    pub ecart_airtel_money: f64,
    /// M-Pesa gap.
    #[serde(default)]
    pub ecart_mpesa: f64,
    /// Orange Money gap.
    #[serde(default)]
    pub ecart_orange_money: f64,
    /// Total gap.
    #[serde(default)]
    pub ecart_total: f64,
    /// Actor who closed the desk.
    pub cloture_par: String,
    /// When the closure was recorded.
    #[serde(default, with = "timestamp::wire_opt")]
    pub date_enregistrement: Option<NaiveDateTime>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Row creation timestamp.
    #[serde(default, with = "timestamp::wire_opt")]
    pub created_at: Option<NaiveDateTime>,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl SyncEntity for ClotureCaisse {
    type Key = (i64, NaiveDate);

    const ENTITY: &'static str = "cloture_caisse";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key(&self) -> Option<Self::Key> {
        Some((self.shop_id, self.date_cloture))
    }

    fn key_label(&self) -> String {
        format!("{}_{}", self.shop_id, self.date_cloture)
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_fk("shop_id", self.shop_id)?;
        validate_required("cloture_par", &self.cloture_par)
    }

    fn shop_id(&self) -> Option<i64> {
        Some(self.shop_id)
    }

    // Closures order by business day first so "the latest closure" means
    // the latest day closed, not the latest edit.
    fn business_timestamp(&self) -> Option<NaiveDateTime> {
        self.date_cloture.and_hms_opt(0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_and_date_parsing() {
        let cloture: ClotureCaisse = serde_json::from_value(serde_json::json!({
            "shop_id": 3,
            "date_cloture": "2024-02-29 18:45:00",
            "cloture_par": "agent7",
            "ecart_total": -12.5,
            "last_modified_at": "2024-02-29 18:50:00"
        }))
        .unwrap();

        assert_eq!(
            cloture.key(),
            Some((3, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        assert_eq!(cloture.key_label(), "3_2024-02-29");

        let json = serde_json::to_value(&cloture).unwrap();
        assert_eq!(json["date_cloture"], "2024-02-29");
    }
}
