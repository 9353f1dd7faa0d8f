//! In-memory repositories.
//!
//! Same contract as the PostgreSQL implementations: serial numbers are
//! unique, listing follows insertion order and maintenance appends happen
//! under the store lock so concurrent appends are additive.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{AssetsRepository, UsersRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetChanges},
        maintenance::MaintenanceEntry,
        user::{NewUser, User, UserCredentials, UserRef},
    },
};

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("In-memory store lock poisoned".to_string())
}

#[derive(Default)]
pub struct MemoryAssetsRepository {
    assets: Mutex<Vec<Asset>>,
}

impl MemoryAssetsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetsRepository for MemoryAssetsRepository {
    async fn insert(&self, asset: &Asset) -> AppResult<()> {
        let mut assets = self.assets.lock().map_err(poisoned)?;
        if assets
            .iter()
            .any(|a| a.weapon_serial_number == asset.weapon_serial_number)
        {
            return Err(AppError::DuplicateSerial);
        }
        assets.push(asset.clone());
        Ok(())
    }

    async fn serial_exists(&self, serial: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let assets = self.assets.lock().map_err(poisoned)?;
        Ok(assets
            .iter()
            .any(|a| a.weapon_serial_number == serial && Some(a.id) != exclude_id))
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Asset>> {
        let assets = self.assets.lock().map_err(poisoned)?;
        Ok(assets
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<i64> {
        let assets = self.assets.lock().map_err(poisoned)?;
        Ok(assets.len() as i64)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let assets = self.assets.lock().map_err(poisoned)?;
        Ok(assets.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_serial(&self, serial: &str) -> AppResult<Option<Asset>> {
        let assets = self.assets.lock().map_err(poisoned)?;
        Ok(assets
            .iter()
            .find(|a| a.weapon_serial_number == serial)
            .cloned())
    }

    async fn update(&self, id: Uuid, changes: &AssetChanges) -> AppResult<Option<Asset>> {
        let mut assets = self.assets.lock().map_err(poisoned)?;

        if let Some(ref serial) = changes.weapon_serial_number {
            if assets
                .iter()
                .any(|a| a.id != id && &a.weapon_serial_number == serial)
            {
                return Err(AppError::DuplicateSerial);
            }
        }

        let Some(asset) = assets.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        if let Some(ref v) = changes.weapon_type {
            asset.weapon_type = v.clone();
        }
        if let Some(ref v) = changes.weapon_serial_number {
            asset.weapon_serial_number = v.clone();
        }
        if let Some(v) = changes.status {
            asset.status = v;
        }
        if let Some(v) = changes.assigned_to {
            asset.assigned_to = v;
        }
        if let Some(v) = changes.issued_by {
            asset.issued_by = v;
        }
        if let Some(ref v) = changes.qr_code {
            asset.qr_code = v.clone();
        }
        asset.updated_at = changes.updated_at;

        Ok(Some(asset.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut assets = self.assets.lock().map_err(poisoned)?;
        let before = assets.len();
        assets.retain(|a| a.id != id);
        Ok(assets.len() < before)
    }

    async fn append_maintenance(&self, id: Uuid, entry: &MaintenanceEntry) -> AppResult<Option<Asset>> {
        let mut assets = self.assets.lock().map_err(poisoned)?;
        let Some(asset) = assets.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        asset.maintenance_log.push(entry.clone());
        asset.updated_at = entry.date;
        Ok(Some(asset.clone()))
    }
}

#[derive(Default)]
pub struct MemoryUsersRepository {
    users: Mutex<Vec<NewUser>>,
}

impl MemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsersRepository for MemoryUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.user.id == id).map(|u| u.user.clone()))
    }

    async fn find_refs(&self, ids: &[Uuid]) -> AppResult<Vec<UserRef>> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .filter(|u| ids.contains(&u.user.id))
            .map(|u| UserRef::from(&u.user))
            .collect())
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let users = self.users.lock().map_err(poisoned)?;
        Ok(users
            .iter()
            .find(|u| u.user.email.eq_ignore_ascii_case(email))
            .map(|u| UserCredentials {
                id: u.user.id,
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn insert(&self, new_user: &NewUser) -> AppResult<()> {
        let mut users = self.users.lock().map_err(poisoned)?;
        if users.iter().any(|u| {
            u.user.username == new_user.user.username
                || u.user.email.eq_ignore_ascii_case(&new_user.user.email)
        }) {
            return Err(AppError::Conflict("Username or email already exists".to_string()));
        }
        users.push(new_user.clone());
        Ok(())
    }
}
