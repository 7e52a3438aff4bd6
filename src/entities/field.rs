//! Contact field entity, installed from fixtures.

use serde::{Deserialize, Serialize};

/// Data type of a contact field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Country,
    Number,
}

/// A field on the contact profile (email, name, company and so on).
/// The default set is loaded from fixture files during installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactField {
    /// Unique machine name, doubles as the record id
    pub alias: String,
    pub label: String,
    pub field_type: FieldType,
    pub field_group: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub order: u32,
}

impl ContactField {
    pub const ENTITY: &'static str = "contact_fields";

    /// Serialize to a storage record
    pub fn record(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("contact field serializes")
    }
}
