//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{AssetResponse, HealthResponse, StatusResponse};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the Campaigner REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campaigner API",
        version = "0.1.0",
        description = "Installation wizard and asset API for the Campaigner marketing automation platform.",
        license(name = "MIT")
    ),
    paths(
        // Health endpoints
        crate::rest::routes::health::health,
        crate::rest::routes::health::status,
        // Installer endpoints
        crate::rest::routes::installer::step_get,
        crate::rest::routes::installer::step_post,
        crate::rest::routes::installer::final_screen,
        // Asset endpoints
        crate::rest::routes::assets::list,
        crate::rest::routes::assets::get_one,
    ),
    components(
        schemas(
            HealthResponse,
            StatusResponse,
            AssetResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check and status endpoints"),
        (name = "Installer", description = "Multi-step installation wizard"),
        (name = "Assets", description = "Read-only asset API"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
