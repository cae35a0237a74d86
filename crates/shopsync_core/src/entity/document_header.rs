//! Printable-document letterhead configuration.

use super::{validate_required, SyncEntity};
use crate::error::CoreResult;
use crate::meta::SyncMeta;
use crate::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Company letterhead used on printed receipts and reports.
///
/// Headers are created centrally, so the numeric id doubles as the natural
/// key; a header uploaded without an id is treated as a fresh row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Server-assigned identity; also the natural key.
    #[serde(default)]
    pub id: Option<i64>,
    /// Company name.
    pub company_name: String,
    /// Company slogan.
    #[serde(default)]
    pub company_slogan: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Web site.
    #[serde(default)]
    pub website: Option<String>,
    /// Logo path on the client device.
    #[serde(default)]
    pub logo_path: Option<String>,
    /// Tax identification number.
    #[serde(default)]
    pub tax_number: Option<String>,
    /// Trade-register number.
    #[serde(default)]
    pub registration_number: Option<String>,
    /// Whether this header is the active one.
    #[serde(default)]
    pub is_active: bool,
    /// Row creation timestamp.
    #[serde(default, with = "timestamp::wire_opt")]
    pub created_at: Option<NaiveDateTime>,
    /// Sync metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl SyncEntity for DocumentHeader {
    type Key = i64;

    const ENTITY: &'static str = "document_headers";

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
        self.id
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.company_name.clone())
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn validate(&self) -> CoreResult<()> {
        validate_required("company_name", &self.company_name)
    }
}
