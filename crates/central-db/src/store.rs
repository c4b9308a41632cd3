//! Record-store seam for the ingestion and retrieval services.

use async_trait::async_trait;
use central_core::models::BackupRecord;
use central_core::AppError;
use chrono::NaiveDate;
use uuid::Uuid;

/// Inclusive calendar-date filter on `uploaded_at`. Either bound may be
/// open.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Persistence operations for backup records.
///
/// Implemented by [`BackupRepository`](crate::BackupRepository) over
/// Postgres; services depend on this trait so pipeline tests can run
/// against an in-memory store. The underlying store is expected to
/// serialize conflicting writes to the same record.
#[async_trait]
pub trait BackupStore: Send + Sync {
    /// Persist a freshly built record (id and uploaded_at already set).
    async fn create(&self, record: &BackupRecord) -> Result<(), AppError>;

    /// Point the record at a new storage key (after relocation).
    async fn set_storage_key(&self, id: Uuid, storage_key: &str) -> Result<(), AppError>;

    /// Set the encrypted storage key and the encryption flag in one update.
    async fn mark_encrypted(&self, id: Uuid, storage_key: &str) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<BackupRecord>, AppError>;

    /// All records for a tenant within the date range, newest first.
    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<BackupRecord>, AppError>;

    /// Remove the record, returning it so the caller can clean up the
    /// backing storage object.
    async fn delete(&self, id: Uuid) -> Result<Option<BackupRecord>, AppError>;
}
