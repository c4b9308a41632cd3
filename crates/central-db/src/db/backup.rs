//! Backup record repository: CRUD for the backups table.

use async_trait::async_trait;
use central_core::models::BackupRecord;
use central_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::store::{BackupStore, DateRange};

const SELECT_COLUMNS: &str = "id, tenant_id, storage_key, original_filename, file_size, \
     checksum, is_encrypted, remarks, uploaded_at";

/// Repository for the backups table.
#[derive(Clone)]
pub struct BackupRepository {
    pool: PgPool,
}

impl BackupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BackupStore for BackupRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "backups", db.operation = "insert", backup_id = %record.id))]
    async fn create(&self, record: &BackupRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO backups (
                id, tenant_id, storage_key, original_filename,
                file_size, checksum, is_encrypted, remarks, uploaded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id)
        .bind(record.tenant_id)
        .bind(&record.storage_key)
        .bind(&record.original_filename)
        .bind(record.file_size)
        .bind(&record.checksum)
        .bind(record.is_encrypted)
        .bind(&record.remarks)
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "backups", db.operation = "update", backup_id = %id))]
    async fn set_storage_key(&self, id: Uuid, storage_key: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE backups SET storage_key = $2 WHERE id = $1")
            .bind(id)
            .bind(storage_key)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Backup {} not found", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "backups", db.operation = "update", backup_id = %id))]
    async fn mark_encrypted(&self, id: Uuid, storage_key: &str) -> Result<(), AppError> {
        // storage_key and is_encrypted move together so the flag always
        // reflects the object actually on disk.
        let result =
            sqlx::query("UPDATE backups SET storage_key = $2, is_encrypted = TRUE WHERE id = $1")
                .bind(id)
                .bind(storage_key)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Backup {} not found", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "backups", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<BackupRecord>, AppError> {
        let record: Option<BackupRecord> = sqlx::query_as::<Postgres, BackupRecord>(&format!(
            "SELECT {} FROM backups WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "backups", tenant_id = %tenant_id))]
    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<BackupRecord>, AppError> {
        let records: Vec<BackupRecord> = sqlx::query_as::<Postgres, BackupRecord>(&format!(
            r#"
            SELECT {}
            FROM backups
            WHERE tenant_id = $1
              AND ($2::date IS NULL OR uploaded_at::date >= $2)
              AND ($3::date IS NULL OR uploaded_at::date <= $3)
            ORDER BY uploaded_at DESC, id DESC
            "#,
            SELECT_COLUMNS
        ))
        .bind(tenant_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "backups", db.operation = "delete", backup_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<Option<BackupRecord>, AppError> {
        let record: Option<BackupRecord> = sqlx::query_as::<Postgres, BackupRecord>(&format!(
            "DELETE FROM backups WHERE id = $1 RETURNING {}",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}
