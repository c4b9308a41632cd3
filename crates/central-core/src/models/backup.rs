use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored backup artifact.
///
/// `checksum` and `file_size` always describe the plaintext as uploaded,
/// regardless of `is_encrypted`; neither is ever recomputed. `storage_key`
/// changes exactly twice over the record's life: temp key at creation,
/// permanent tenant key after relocation, and the permanent key with the
/// encryption suffix once encryption succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BackupRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub storage_key: String,
    pub original_filename: String,
    /// Plaintext size in bytes, captured before encryption
    pub file_size: i64,
    /// Hex-encoded SHA-256 of the plaintext, computed before encryption
    pub checksum: String,
    pub is_encrypted: bool,
    pub remarks: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Backup metadata in API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct BackupResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub original_filename: String,
    pub file_size: i64,
    #[schema(example = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")]
    pub checksum: String,
    pub is_encrypted: bool,
    pub remarks: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<BackupRecord> for BackupResponse {
    fn from(record: BackupRecord) -> Self {
        Self {
            id: record.id,
            tenant_id: record.tenant_id,
            original_filename: record.original_filename,
            file_size: record.file_size,
            checksum: record.checksum,
            is_encrypted: record.is_encrypted,
            remarks: record.remarks,
            uploaded_at: record.uploaded_at,
        }
    }
}
