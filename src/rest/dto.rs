//! Data Transfer Objects for the REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::asset::{Asset, StorageLocation};

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Service status response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    /// Whether the installation wizard has completed (site secret present)
    pub installed: bool,
    pub step_count: usize,
}

/// Serialized asset
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    pub id: String,
    pub title: String,
    pub alias: String,
    pub storage_location: String,
    pub path: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<&Asset> for AssetResponse {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            title: asset.title.clone(),
            alias: asset.alias.clone(),
            storage_location: match asset.storage_location {
                StorageLocation::Local => "local".to_string(),
                StorageLocation::Remote => "remote".to_string(),
            },
            path: asset.path.clone(),
            created_by: asset.created_by.clone(),
            created_at: asset.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_response_from_entity() {
        let asset = Asset::new("Q3 Report", "reports/q3.pdf", "u1");
        let resp = AssetResponse::from(&asset);
        assert_eq!(resp.title, "Q3 Report");
        assert_eq!(resp.storage_location, "local");
        assert_eq!(resp.created_by, "u1");
    }
}
