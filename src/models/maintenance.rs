//! Maintenance log entries attached to an asset

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceStatus {
    #[default]
    Pending,
    Completed,
    InProgress,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::InProgress => "in-progress",
        }
    }
}

impl std::str::FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MaintenanceStatus::Pending),
            "completed" => Ok(MaintenanceStatus::Completed),
            "in-progress" => Ok(MaintenanceStatus::InProgress),
            _ => Err(format!("Invalid maintenance status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for MaintenanceStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for MaintenanceStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for MaintenanceStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// One logged service or inspection event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub description: String,
    pub status: MaintenanceStatus,
}

impl MaintenanceEntry {
    /// New entry dated now
    pub fn new(description: String, status: MaintenanceStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            description,
            status,
        }
    }
}

/// Add maintenance entry request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateMaintenanceEntry {
    /// Required, must not be blank
    pub description: Option<String>,
    /// Defaults to "pending"
    pub status: Option<MaintenanceStatus>,
}
