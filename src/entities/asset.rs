//! Downloadable asset entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an asset's file lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub title: String,
    pub alias: String,
    pub storage_location: StorageLocation,
    /// File path or URL, depending on `storage_location`
    pub path: String,
    /// Id of the user that created the asset
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub const ENTITY: &'static str = "assets";

    pub fn new(title: &str, path: &str, created_by: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            alias: title.to_lowercase().replace(' ', "-"),
            storage_location: StorageLocation::Local,
            path: path.to_string(),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Serialize to a storage record
    pub fn record(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("asset serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_from_title() {
        let asset = Asset::new("Product Brochure", "brochure.pdf", "u1");
        assert_eq!(asset.alias, "product-brochure");
        assert_eq!(asset.storage_location, StorageLocation::Local);
    }
}
