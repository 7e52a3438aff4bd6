//! Asset read endpoints.
//!
//! Listing is ownership-filtered: a requester without the view-others
//! capability only sees assets they created.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::entities::Asset;
use crate::rest::dto::AssetResponse;
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::{ApiState, Requester};

/// Header naming the requesting user
pub const AUTH_USER_HEADER: &str = "x-auth-user";

async fn requester(state: &ApiState, headers: &HeaderMap) -> Result<Requester, ApiError> {
    let username = headers
        .get(AUTH_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {AUTH_USER_HEADER} header")))?;
    state.resolve_requester(username).await
}

/// List assets visible to the requester
#[utoipa::path(
    get,
    path = "/api/v1/assets",
    tag = "Assets",
    responses(
        (status = 200, description = "Assets the requester may see", body = Vec<AssetResponse>),
        (status = 401, description = "Missing or unknown requester", body = ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AssetResponse>>, ApiError> {
    let requester = requester(&state, &headers).await?;
    let database = state.database().await;

    let records = state.storage.list(&database, Asset::ENTITY).await?;
    let mut assets = Vec::new();
    for record in records {
        let asset: Asset = serde_json::from_value(record)?;
        if requester.can_view_others || asset.created_by == requester.user_id {
            assets.push(AssetResponse::from(&asset));
        }
    }

    Ok(Json(assets))
}

/// Get a single asset by id
#[utoipa::path(
    get,
    path = "/api/v1/assets/{id}",
    tag = "Assets",
    params(
        ("id" = String, Path, description = "Asset id")
    ),
    responses(
        (status = 200, description = "Asset details", body = AssetResponse),
        (status = 401, description = "Missing or unknown requester", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AssetResponse>, ApiError> {
    let _requester = requester(&state, &headers).await?;
    let database = state.database().await;

    let record = state
        .storage
        .find(&database, Asset::ENTITY, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Asset '{id}' not found")))?;

    let asset: Asset = serde_json::from_value(record)?;
    Ok(Json(AssetResponse::from(&asset)))
}
