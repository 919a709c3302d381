//! Supplier Model

use serde::{Deserialize, Serialize};
use shared::{MappingConfig, Timestamp};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactKind {
    Email,
    Phone,
}

/// Supplier contact entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

/// Supplier model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: u64,
    /// Unique across the directory
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    /// Column layout of this supplier's spreadsheets
    pub mapping_config: Option<MappingConfig>,
    /// Brand names collected from this supplier's catalog imports.
    /// System-maintained cache; supplier updates never touch it.
    #[serde(default)]
    pub detected_brands: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Supplier {
    pub fn new(id: u64, draft: SupplierDraft) -> Self {
        let now = shared::now_millis();
        Self {
            id,
            name: draft.name,
            notes: draft.notes,
            contacts: draft.contacts,
            mapping_config: draft.mapping_config,
            detected_brands: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating or replacing supplier master data.
/// `detected_brands` is deliberately absent here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SupplierDraft {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    pub mapping_config: Option<MappingConfig>,
}
