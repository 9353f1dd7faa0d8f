//! Weapon asset model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{maintenance::MaintenanceEntry, user::UserRef};

/// Lifecycle status of a weapon asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Active,
    Issued,
    Maintenance,
    Decommissioned,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "active",
            AssetStatus::Issued => "issued",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::Decommissioned => "decommissioned",
        }
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AssetStatus::Active),
            "issued" => Ok(AssetStatus::Issued),
            "maintenance" => Ok(AssetStatus::Maintenance),
            "decommissioned" => Ok(AssetStatus::Decommissioned),
            _ => Err(format!("Invalid asset status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for AssetStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AssetStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AssetStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Stored weapon asset, references left as user ids
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    /// Free-text classification, e.g. "Rifle"
    pub weapon_type: String,
    /// Unique physical identifier of the weapon
    pub weapon_serial_number: String,
    pub status: AssetStatus,
    /// User the weapon is assigned to
    pub assigned_to: Uuid,
    /// User (typically an officer) who issued the weapon
    pub issued_by: Uuid,
    /// QR code data URL encoding the serial number
    pub qr_code: String,
    #[sqlx(skip)]
    pub maintenance_log: Vec<MaintenanceEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Asset with `assignedTo` / `issuedBy` expanded to username and email.
///
/// A reference to a user that no longer exists expands to `null`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    pub id: Uuid,
    pub weapon_type: String,
    pub weapon_serial_number: String,
    pub status: AssetStatus,
    pub assigned_to: Option<UserRef>,
    pub issued_by: Option<UserRef>,
    pub qr_code: String,
    pub maintenance_log: Vec<MaintenanceEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetDetails {
    pub fn from_asset(asset: Asset, assigned_to: Option<UserRef>, issued_by: Option<UserRef>) -> Self {
        Self {
            id: asset.id,
            weapon_type: asset.weapon_type,
            weapon_serial_number: asset.weapon_serial_number,
            status: asset.status,
            assigned_to,
            issued_by,
            qr_code: asset.qr_code,
            maintenance_log: asset.maintenance_log,
            created_at: asset.created_at,
            updated_at: asset.updated_at,
        }
    }
}

/// Create asset request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    #[validate(length(min = 1, message = "weaponType is required"))]
    pub weapon_type: String,
    #[validate(length(min = 1, message = "weaponSerialNumber is required"))]
    pub weapon_serial_number: String,
    pub assigned_to: Uuid,
    pub issued_by: Uuid,
}

/// Update asset request.
///
/// Only these fields can be changed; anything else in the body (`id`,
/// `qrCode`, `maintenanceLog`, timestamps) is ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    #[validate(length(min = 1, message = "weaponType cannot be empty"))]
    pub weapon_type: Option<String>,
    #[validate(length(min = 1, message = "weaponSerialNumber cannot be empty"))]
    pub weapon_serial_number: Option<String>,
    pub status: Option<AssetStatus>,
    pub assigned_to: Option<Uuid>,
    pub issued_by: Option<Uuid>,
}

/// Field set applied to a stored asset by the repository
#[derive(Debug, Clone, Default)]
pub struct AssetChanges {
    pub weapon_type: Option<String>,
    pub weapon_serial_number: Option<String>,
    pub status: Option<AssetStatus>,
    pub assigned_to: Option<Uuid>,
    pub issued_by: Option<Uuid>,
    pub qr_code: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One page of assets
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    pub assets: Vec<AssetDetails>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_assets: i64,
}

/// Delete confirmation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
