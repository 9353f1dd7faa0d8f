//! Repository layer for database operations

pub mod assets;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        asset::{Asset, AssetChanges},
        maintenance::MaintenanceEntry,
        user::{NewUser, User, UserCredentials, UserRef},
    },
};

/// Persistence for weapon assets and their maintenance log
#[async_trait]
pub trait AssetsRepository: Send + Sync {
    /// Insert a new asset. A serial number already in storage fails with
    /// `AppError::DuplicateSerial`.
    async fn insert(&self, asset: &Asset) -> AppResult<()>;

    async fn serial_exists(&self, serial: &str, exclude_id: Option<Uuid>) -> AppResult<bool>;

    /// Assets in insertion order
    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Asset>>;

    async fn count(&self) -> AppResult<i64>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>>;

    async fn find_by_serial(&self, serial: &str) -> AppResult<Option<Asset>>;

    /// Apply the given field set; `None` if the asset does not exist
    async fn update(&self, id: Uuid, changes: &AssetChanges) -> AppResult<Option<Asset>>;

    /// `false` if the asset does not exist
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Atomically append to the maintenance log; `None` if the asset does not exist
    async fn append_maintenance(&self, id: Uuid, entry: &MaintenanceEntry) -> AppResult<Option<Asset>>;
}

/// User directory
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Username and email of each existing user among `ids`
    async fn find_refs(&self, ids: &[Uuid]) -> AppResult<Vec<UserRef>>;

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    /// Insert a user. Duplicate username or email fails with `AppError::Conflict`.
    async fn insert(&self, user: &NewUser) -> AppResult<()>;
}

/// Main repository struct holding the store implementations
#[derive(Clone)]
pub struct Repository {
    pub assets: Arc<dyn AssetsRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            assets: Arc::new(assets::PgAssetsRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool)),
        }
    }

    /// Repository backed by process memory
    pub fn in_memory() -> Self {
        Self {
            assets: Arc::new(memory::MemoryAssetsRepository::new()),
            users: Arc::new(memory::MemoryUsersRepository::new()),
        }
    }
}

/// `true` if the error is a unique-constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
