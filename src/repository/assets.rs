//! Assets repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{is_unique_violation, AssetsRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetChanges},
        maintenance::MaintenanceEntry,
    },
};

const ASSET_COLUMNS: &str = "id, weapon_type, weapon_serial_number, status, assigned_to, issued_by, \
     qr_code, created_at, updated_at";

#[derive(Clone)]
pub struct PgAssetsRepository {
    pool: Pool<Postgres>,
}

impl PgAssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load the maintenance log of a single asset
    async fn load_log(&self, mut asset: Asset) -> AppResult<Asset> {
        asset.maintenance_log = sqlx::query_as::<_, MaintenanceEntry>(
            r#"
            SELECT id, date, description, status
            FROM asset_maintenance
            WHERE asset_id = $1
            ORDER BY position
            "#,
        )
        .bind(asset.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(asset)
    }

    /// Load the maintenance logs of many assets in one query
    async fn load_logs(&self, mut assets: Vec<Asset>) -> AppResult<Vec<Asset>> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let ids: Vec<Uuid> = assets.iter().map(|a| a.id).collect();

        #[derive(sqlx::FromRow)]
        struct Row {
            asset_id: Uuid,
            #[sqlx(flatten)]
            entry: MaintenanceEntry,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT asset_id, id, date, description, status
            FROM asset_maintenance
            WHERE asset_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            if let Some(asset) = assets.iter_mut().find(|a| a.id == row.asset_id) {
                asset.maintenance_log.push(row.entry);
            }
        }
        Ok(assets)
    }
}

#[async_trait]
impl AssetsRepository for PgAssetsRepository {
    async fn insert(&self, asset: &Asset) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, weapon_type, weapon_serial_number, status, assigned_to,
                                issued_by, qr_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(asset.id)
        .bind(&asset.weapon_type)
        .bind(&asset.weapon_serial_number)
        .bind(asset.status)
        .bind(asset.assigned_to)
        .bind(asset.issued_by)
        .bind(&asset.qr_code)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateSerial
            } else {
                AppError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn serial_exists(&self, serial: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM assets WHERE weapon_serial_number = $1 AND id != $2)",
            )
            .bind(serial)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assets WHERE weapon_serial_number = $1)")
                .bind(serial)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Asset>> {
        let query = format!(
            "SELECT {} FROM assets ORDER BY position LIMIT $1 OFFSET $2",
            ASSET_COLUMNS
        );
        let assets = sqlx::query_as::<_, Asset>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        self.load_logs(assets).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Asset>> {
        let query = format!("SELECT {} FROM assets WHERE id = $1", ASSET_COLUMNS);
        match sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        {
            Some(asset) => Ok(Some(self.load_log(asset).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_serial(&self, serial: &str) -> AppResult<Option<Asset>> {
        let query = format!(
            "SELECT {} FROM assets WHERE weapon_serial_number = $1",
            ASSET_COLUMNS
        );
        match sqlx::query_as::<_, Asset>(&query)
            .bind(serial)
            .fetch_optional(&self.pool)
            .await?
        {
            Some(asset) => Ok(Some(self.load_log(asset).await?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, changes: &AssetChanges) -> AppResult<Option<Asset>> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(changes.weapon_type, "weapon_type");
        add_field!(changes.weapon_serial_number, "weapon_serial_number");
        add_field!(changes.status, "status");
        add_field!(changes.assigned_to, "assigned_to");
        add_field!(changes.issued_by, "issued_by");
        add_field!(changes.qr_code, "qr_code");

        let query = format!(
            "UPDATE assets SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            ASSET_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Asset>(&query).bind(changes.updated_at);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.weapon_type);
        bind_field!(changes.weapon_serial_number);
        bind_field!(changes.status);
        bind_field!(changes.assigned_to);
        bind_field!(changes.issued_by);
        bind_field!(changes.qr_code);

        let updated = builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateSerial
                } else {
                    AppError::Database(e)
                }
            })?;

        match updated {
            Some(asset) => Ok(Some(self.load_log(asset).await?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_maintenance(&self, id: Uuid, entry: &MaintenanceEntry) -> AppResult<Option<Asset>> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the asset keeps a concurrent delete out until commit
        let touched = sqlx::query("UPDATE assets SET updated_at = $1 WHERE id = $2")
            .bind(entry.date)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO asset_maintenance (id, asset_id, date, description, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(id)
        .bind(entry.date)
        .bind(&entry.description)
        .bind(entry.status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id).await
    }
}
