//! Installation wizard endpoints.
//!
//! The step index is part of the URL, never server-side session state, so
//! a retried request replays the same step.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::installer::{RenderDirective, RequestMethod};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Render the form for one wizard step
#[utoipa::path(
    get,
    path = "/installer/step/{index}",
    tag = "Installer",
    params(
        ("index" = usize, Path, description = "Zero-based step index")
    ),
    responses(
        (status = 200, description = "Step form to render"),
        (status = 404, description = "Unknown step index", body = ErrorResponse)
    )
)]
pub async fn step_get(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
) -> Result<Json<RenderDirective>, ApiError> {
    let mut configurator = state.configurator.write().await;
    let directive = state
        .workflow
        .handle_step(&mut configurator, index, RequestMethod::Get, &BTreeMap::new())
        .await?;
    Ok(Json(directive))
}

/// Submit one wizard step
#[utoipa::path(
    post,
    path = "/installer/step/{index}",
    tag = "Installer",
    params(
        ("index" = usize, Path, description = "Zero-based step index")
    ),
    request_body = BTreeMap<String, String>,
    responses(
        (status = 200, description = "Next step form, the same step with errors, or the completion screen"),
        (status = 404, description = "Unknown step index", body = ErrorResponse)
    )
)]
pub async fn step_post(
    State(state): State<ApiState>,
    Path(index): Path<usize>,
    Json(payload): Json<BTreeMap<String, String>>,
) -> Result<Json<RenderDirective>, ApiError> {
    let mut configurator = state.configurator.write().await;
    let directive = state
        .workflow
        .handle_step(&mut configurator, index, RequestMethod::Post, &payload)
        .await?;
    Ok(Json(directive))
}

/// Render the completion screen
#[utoipa::path(
    get,
    path = "/installer/final",
    tag = "Installer",
    responses(
        (status = 200, description = "Completion screen with the configuration snapshot")
    )
)]
pub async fn final_screen(State(state): State<ApiState>) -> Json<RenderDirective> {
    let configurator = state.configurator.read().await;
    Json(state.workflow.final_screen(&configurator))
}
