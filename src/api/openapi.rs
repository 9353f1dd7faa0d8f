//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, auth, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Armory API",
        version = "1.0.0",
        description = "Weapon asset tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Assets
        assets::create_asset,
        assets::list_assets,
        assets::get_asset,
        assets::get_asset_by_serial,
        assets::update_asset,
        assets::delete_asset,
        assets::add_maintenance_entry,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::User,
            crate::models::user::UserRef,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetDetails,
            crate::models::asset::AssetStatus,
            crate::models::asset::AssetPage,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            crate::models::asset::MessageResponse,
            crate::models::maintenance::MaintenanceEntry,
            crate::models::maintenance::MaintenanceStatus,
            crate::models::maintenance::CreateMaintenanceEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "assets", description = "Weapon asset tracking")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_asset_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/assets",
            "/assets/{id}",
            "/assets/serial/{serial_no}",
            "/assets/{id}/maintenance",
            "/auth/login",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }
    }
}
