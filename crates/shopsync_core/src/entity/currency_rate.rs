//! Exchange rates between supported currencies.

use super::{validate_required, SyncEntity};
use crate::error::{CoreError, CoreResult};
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An exchange rate for a currency pair, keyed by
/// `(from_currency, to_currency)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Server-assigned identity.
    #[serde(default)]
    pub id: Option<i64>,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Units of `to_currency` per unit of `from_currency`.
    pub rate: f64,
    /// Actor who last set the rate.
    #[serde(default)]
    pub updated_by: Option<String>,
    /// Row creation timestamp.
    #[serde(default, with = "timestamp::wire_opt")]
    pub created_at: Option<NaiveDateTime>,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl SyncEntity for CurrencyRate {
    type Key = (String, String);

    const ENTITY: &'static str = "currency_rates";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key(&self) -> Option<Self::Key> {
        Some((self.from_currency.clone(), self.to_currency.clone()))
    }

    fn key_label(&self) -> String {
        format!("{}->{}", self.from_currency, self.to_currency)
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_required("from_currency", &self.from_currency)?;
        validate_required("to_currency", &self.to_currency)?;
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(CoreError::validation("rate must be a positive number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_rejected() {
        let rate: CurrencyRate = serde_json::from_value(serde_json::json!({
            "from_currency": "USD",
            "to_currency": "CDF",
            "rate": 0.0,
            "last_modified_at": "2024-01-01 08:00:00"
        }))
        .unwrap();
        assert!(rate.validate().is_err());
    }
}
