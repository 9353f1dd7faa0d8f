//! Asset endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetDetails, AssetPage, CreateAsset, MessageResponse, UpdateAsset},
        maintenance::CreateMaintenanceEntry,
        pagination::{PageQuery, Pagination},
    },
};

use super::{AppJson, AppQuery, AuthenticatedUser};

/// A malformed id cannot match any asset
fn parse_asset_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::asset_not_found())
}

/// Create a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Duplicate serial number or invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppJson(data): AppJson<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    let asset = state.services.assets.create(data).await?;
    tracing::info!(
        user_id = %user.id,
        asset_id = %asset.id,
        "Asset created: {}",
        asset.weapon_serial_number
    );
    Ok((StatusCode::CREATED, Json(asset)))
}

/// List assets with pagination
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "One page of assets", body = AssetPage),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    AppQuery(query): AppQuery<PageQuery>,
) -> AppResult<Json<AssetPage>> {
    let page = state.services.assets.list(Pagination::from(&query)).await?;
    Ok(Json(page))
}

/// Get asset by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = AssetDetails),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<AssetDetails>> {
    let id = parse_asset_id(&id)?;
    let asset = state.services.assets.get_by_id(id).await?;
    Ok(Json(asset))
}

/// Get asset by weapon serial number (QR scan)
#[utoipa::path(
    get,
    path = "/assets/serial/{serial_no}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("serial_no" = String, Path, description = "Weapon serial number, exact match")),
    responses(
        (status = 200, description = "Asset details", body = AssetDetails),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_asset_by_serial(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(serial_no): Path<String>,
) -> AppResult<Json<AssetDetails>> {
    let asset = state.services.assets.get_by_serial(&serial_no).await?;
    Ok(Json(asset))
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 400, description = "Duplicate serial number or invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(data): AppJson<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    let id = parse_asset_id(&id)?;
    let asset = state.services.assets.update(id, data).await?;
    tracing::info!(user_id = %user.id, asset_id = %asset.id, "Asset updated");
    Ok(Json(asset))
}

/// Delete an asset
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset deleted", body = MessageResponse),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_asset_id(&id)?;
    state.services.assets.delete(id).await?;
    tracing::info!(user_id = %user.id, asset_id = %id, "Asset deleted");
    Ok(Json(MessageResponse {
        message: "Asset deleted successfully".to_string(),
    }))
}

/// Add a maintenance entry to an asset
#[utoipa::path(
    post,
    path = "/assets/{id}/maintenance",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = CreateMaintenanceEntry,
    responses(
        (status = 200, description = "Entry appended", body = Asset),
        (status = 400, description = "Missing description", body = crate::error::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_maintenance_entry(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
    AppJson(data): AppJson<CreateMaintenanceEntry>,
) -> AppResult<Json<Asset>> {
    let id = parse_asset_id(&id)?;
    let asset = state.services.assets.add_maintenance(id, data).await?;
    tracing::info!(
        user_id = %user.id,
        asset_id = %asset.id,
        entries = asset.maintenance_log.len(),
        "Maintenance entry added"
    );
    Ok(Json(asset))
}
