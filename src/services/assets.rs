//! Asset service: weapon asset lifecycle and maintenance log

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetChanges, AssetDetails, AssetPage, AssetStatus, CreateAsset, UpdateAsset},
        maintenance::{CreateMaintenanceEntry, MaintenanceEntry},
        pagination::Pagination,
        user::UserRef,
    },
    repository::Repository,
};

use super::qr::QrEncoder;

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
    qr: Arc<dyn QrEncoder>,
}

/// Trim and reject blank text
fn required_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

impl AssetsService {
    pub fn new(repository: Repository, qr: Arc<dyn QrEncoder>) -> Self {
        Self { repository, qr }
    }

    /// Register a new weapon asset with a freshly generated QR code
    pub async fn create(&self, data: CreateAsset) -> AppResult<Asset> {
        data.validate()?;
        let weapon_type = required_text("weaponType", &data.weapon_type)?;
        let serial = required_text("weaponSerialNumber", &data.weapon_serial_number)?;

        if self.repository.assets.serial_exists(&serial, None).await? {
            return Err(AppError::DuplicateSerial);
        }

        let qr_code = self.qr.encode(&serial)?;
        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4(),
            weapon_type,
            weapon_serial_number: serial,
            status: AssetStatus::Active,
            assigned_to: data.assigned_to,
            issued_by: data.issued_by,
            qr_code,
            maintenance_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        // The unique constraint still catches a concurrent create with the same serial
        self.repository.assets.insert(&asset).await?;
        Ok(asset)
    }

    /// One page of assets in insertion order, references expanded
    pub async fn list(&self, pagination: Pagination) -> AppResult<AssetPage> {
        let assets = self
            .repository
            .assets
            .list(pagination.offset(), pagination.limit)
            .await?;
        let total_assets = self.repository.assets.count().await?;

        Ok(AssetPage {
            assets: self.expand(assets).await?,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total_assets),
            total_assets,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<AssetDetails> {
        let asset = self
            .repository
            .assets
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::asset_not_found)?;
        self.expand_one(asset).await
    }

    /// Exact-match lookup used when scanning a QR code
    pub async fn get_by_serial(&self, serial: &str) -> AppResult<AssetDetails> {
        let asset = self
            .repository
            .assets
            .find_by_serial(serial)
            .await?
            .ok_or_else(AppError::asset_not_found)?;
        self.expand_one(asset).await
    }

    /// Overwrite the provided fields. A serial change must stay unique and
    /// regenerates the QR code.
    pub async fn update(&self, id: Uuid, data: UpdateAsset) -> AppResult<Asset> {
        data.validate()?;

        let weapon_type = data
            .weapon_type
            .as_deref()
            .map(|v| required_text("weaponType", v))
            .transpose()?;
        let serial = data
            .weapon_serial_number
            .as_deref()
            .map(|v| required_text("weaponSerialNumber", v))
            .transpose()?;

        let mut qr_code = None;
        if let Some(ref serial) = serial {
            let current = self
                .repository
                .assets
                .find_by_id(id)
                .await?
                .ok_or_else(AppError::asset_not_found)?;

            if &current.weapon_serial_number != serial {
                if self.repository.assets.serial_exists(serial, Some(id)).await? {
                    return Err(AppError::DuplicateSerial);
                }
                qr_code = Some(self.qr.encode(serial)?);
            }
        }

        let changes = AssetChanges {
            weapon_type,
            weapon_serial_number: serial,
            status: data.status,
            assigned_to: data.assigned_to,
            issued_by: data.issued_by,
            qr_code,
            updated_at: Utc::now(),
        };

        self.repository
            .assets
            .update(id, &changes)
            .await?
            .ok_or_else(AppError::asset_not_found)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.assets.delete(id).await? {
            return Err(AppError::asset_not_found());
        }
        Ok(())
    }

    /// Append one entry to the asset's maintenance log
    pub async fn add_maintenance(&self, id: Uuid, data: CreateMaintenanceEntry) -> AppResult<Asset> {
        let description = required_text("description", data.description.as_deref().unwrap_or_default())?;
        let entry = MaintenanceEntry::new(description, data.status.unwrap_or_default());

        self.repository
            .assets
            .append_maintenance(id, &entry)
            .await?
            .ok_or_else(AppError::asset_not_found)
    }

    async fn expand_one(&self, asset: Asset) -> AppResult<AssetDetails> {
        self.expand(vec![asset])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Reference expansion lost an asset".to_string()))
    }

    /// Replace user ids with username/email, one directory lookup per batch
    async fn expand(&self, assets: Vec<Asset>) -> AppResult<Vec<AssetDetails>> {
        let mut ids: Vec<Uuid> = assets
            .iter()
            .flat_map(|a| [a.assigned_to, a.issued_by])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users: HashMap<Uuid, UserRef> = self
            .repository
            .users
            .find_refs(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(assets
            .into_iter()
            .map(|asset| {
                let assigned_to = users.get(&asset.assigned_to).cloned();
                let issued_by = users.get(&asset.issued_by).cloned();
                AssetDetails::from_asset(asset, assigned_to, issued_by)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        models::{
            maintenance::MaintenanceStatus,
            user::{NewUser, User},
        },
        services::qr::MockQrEncoder,
    };

    fn stub_qr() -> Arc<dyn QrEncoder> {
        let mut qr = MockQrEncoder::new();
        qr.expect_encode()
            .returning(|serial| Ok(format!("qr:{}", serial)));
        Arc::new(qr)
    }

    async fn seed_user(repository: &Repository, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.mil", username),
            created_at: Utc::now(),
        };
        repository
            .users
            .insert(&NewUser {
                user: user.clone(),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        user
    }

    fn create_request(serial: &str, assigned_to: Uuid, issued_by: Uuid) -> CreateAsset {
        CreateAsset {
            weapon_type: "Rifle".to_string(),
            weapon_serial_number: serial.to_string(),
            assigned_to,
            issued_by,
        }
    }

    #[tokio::test]
    async fn test_create_sets_defaults_and_qr_code() {
        let repository = Repository::in_memory();
        let mut qr = MockQrEncoder::new();
        qr.expect_encode()
            .with(eq("SN-001"))
            .times(1)
            .returning(|_| Ok("data:qr".to_string()));
        let service = AssetsService::new(repository, Arc::new(qr));

        let asset = service
            .create(create_request("  SN-001 ", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        assert_eq!(asset.weapon_serial_number, "SN-001");
        assert_eq!(asset.status, AssetStatus::Active);
        assert_eq!(asset.qr_code, "data:qr");
        assert!(asset.maintenance_log.is_empty());
        assert_eq!(asset.created_at, asset.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_serial_is_rejected_before_encoding() {
        let repository = Repository::in_memory();
        let mut qr = MockQrEncoder::new();
        qr.expect_encode().times(1).returning(|_| Ok("data:qr".to_string()));
        let service = AssetsService::new(repository.clone(), Arc::new(qr));

        service
            .create(create_request("SN-001", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        let err = service
            .create(create_request("SN-001", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateSerial));
        assert_eq!(repository.assets.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_blank_fields_fail_validation() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());

        let mut request = create_request("   ", Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(service.create(request.clone()).await, Err(AppError::Validation(_))));

        request.weapon_serial_number = "SN-9".to_string();
        request.weapon_type = " ".to_string();
        assert!(matches!(service.create(request).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_long_serial_numbers_are_accepted() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        let long_serial = "S".repeat(101);

        let created = service
            .create(create_request(&format!("  {}  ", long_serial), Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(created.weapon_serial_number, long_serial);

        let renamed = "R".repeat(250);
        let updated = service
            .update(
                created.id,
                UpdateAsset {
                    weapon_serial_number: Some(renamed.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.weapon_serial_number, renamed);
        assert_eq!(updated.qr_code, format!("qr:{}", renamed));
    }

    #[tokio::test]
    async fn test_lookups_expand_references() {
        let repository = Repository::in_memory();
        let holder = seed_user(&repository, "pvt.ortiz").await;
        let officer = seed_user(&repository, "capt.lane").await;
        let service = AssetsService::new(repository, stub_qr());

        let created = service
            .create(create_request("SN-100", holder.id, officer.id))
            .await
            .unwrap();

        let by_serial = service.get_by_serial("SN-100").await.unwrap();
        assert_eq!(by_serial.id, created.id);
        assert_eq!(by_serial.assigned_to, Some(UserRef::from(&holder)));
        assert_eq!(by_serial.issued_by, Some(UserRef::from(&officer)));

        let by_id = service.get_by_id(created.id).await.unwrap();
        assert_eq!(by_id.weapon_serial_number, "SN-100");
    }

    #[tokio::test]
    async fn test_unknown_keys_are_not_found() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());

        assert!(matches!(service.get_by_id(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get_by_serial("SN-404").await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(Uuid::new_v4(), UpdateAsset::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_serial_lookup_is_exact() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        service
            .create(create_request("SN-200", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        assert!(service.get_by_serial("sn-200").await.is_err());
        assert!(service.get_by_serial("SN-20").await.is_err());
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        for i in 0..23 {
            service
                .create(create_request(&format!("SN-{:03}", i), Uuid::new_v4(), Uuid::new_v4()))
                .await
                .unwrap();
        }

        for limit in [1, 5, 10, 23, 50] {
            let first = service.list(Pagination::new(Some(1), Some(limit))).await.unwrap();
            assert_eq!(first.total_assets, 23);
            assert_eq!(first.total_pages, (23 + limit - 1) / limit);
            assert!(first.assets.len() as i64 <= limit);
        }

        let last = service.list(Pagination::new(Some(3), Some(10))).await.unwrap();
        assert_eq!(last.current_page, 3);
        assert_eq!(last.assets.len(), 3);
        assert_eq!(last.assets[0].weapon_serial_number, "SN-020");

        let beyond = service.list(Pagination::new(Some(9), Some(10))).await.unwrap();
        assert!(beyond.assets.is_empty());
    }

    #[tokio::test]
    async fn test_update_overwrites_only_given_fields() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        let created = service
            .create(create_request("SN-300", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        let new_holder = Uuid::new_v4();

        let updated = service
            .update(
                created.id,
                UpdateAsset {
                    status: Some(AssetStatus::Issued),
                    assigned_to: Some(new_holder),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, AssetStatus::Issued);
        assert_eq!(updated.assigned_to, new_holder);
        assert_eq!(updated.weapon_type, created.weapon_type);
        assert_eq!(updated.issued_by, created.issued_by);
        assert_eq!(updated.qr_code, created.qr_code);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_serial_change_checks_uniqueness_and_refreshes_qr() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        service
            .create(create_request("SN-A", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        let other = service
            .create(create_request("SN-B", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let taken = UpdateAsset {
            weapon_serial_number: Some("SN-A".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update(other.id, taken).await, Err(AppError::DuplicateSerial)));

        let renamed = service
            .update(
                other.id,
                UpdateAsset {
                    weapon_serial_number: Some("SN-C".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.weapon_serial_number, "SN-C");
        assert_eq!(renamed.qr_code, "qr:SN-C");
    }

    #[tokio::test]
    async fn test_maintenance_log_is_append_only() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        let created = service
            .create(create_request("SN-400", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let mut previous: Vec<MaintenanceEntry> = Vec::new();
        for i in 0..5 {
            let status = if i % 2 == 0 { None } else { Some(MaintenanceStatus::Completed) };
            let asset = service
                .add_maintenance(
                    created.id,
                    CreateMaintenanceEntry {
                        description: Some(format!("inspection {}", i)),
                        status,
                    },
                )
                .await
                .unwrap();

            assert_eq!(asset.maintenance_log.len(), i + 1);
            assert_eq!(&asset.maintenance_log[..i], &previous[..]);
            let last = asset.maintenance_log.last().unwrap();
            assert_eq!(last.description, format!("inspection {}", i));
            assert_eq!(last.status, status.unwrap_or(MaintenanceStatus::Pending));
            previous = asset.maintenance_log;
        }
    }

    #[tokio::test]
    async fn test_maintenance_requires_description_and_asset() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        let created = service
            .create(create_request("SN-500", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let blank = CreateMaintenanceEntry {
            description: Some("  ".to_string()),
            status: None,
        };
        assert!(matches!(
            service.add_maintenance(created.id, blank).await,
            Err(AppError::Validation(_))
        ));

        let entry = CreateMaintenanceEntry {
            description: Some("barrel replaced".to_string()),
            status: None,
        };
        assert!(matches!(
            service.add_maintenance(Uuid::new_v4(), entry).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_asset() {
        let service = AssetsService::new(Repository::in_memory(), stub_qr());
        let created = service
            .create(create_request("SN-600", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.get_by_id(created.id).await, Err(AppError::NotFound(_))));

        // The serial is free again
        service
            .create(create_request("SN-600", Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
    }
}
