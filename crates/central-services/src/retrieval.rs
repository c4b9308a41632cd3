//! Backup retrieval: single downloads, date-filtered zip bundles, and the
//! admin delete.
//!
//! Decryption is transparent: callers always receive the plaintext bytes
//! that were uploaded, whether or not the object is encrypted at rest.

use central_core::models::{BackupRecord, Tenant};
use central_core::{AppError, BackupCipher};
use central_db::{BackupStore, DateRange};
use central_storage::Storage;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// A backup ready to hand to a caller: plaintext bytes plus the filename
/// it was uploaded under. `tenant_id` lets callers enforce tenant scoping.
#[derive(Debug)]
pub struct FetchedBackup {
    pub data: Vec<u8>,
    pub filename: String,
    pub tenant_id: Uuid,
}

/// Serves stored backups back out of the vault.
#[derive(Clone)]
pub struct RetrievalService {
    store: Arc<dyn BackupStore>,
    storage: Arc<dyn Storage>,
    cipher: BackupCipher,
}

impl RetrievalService {
    pub fn new(
        store: Arc<dyn BackupStore>,
        storage: Arc<dyn Storage>,
        cipher: BackupCipher,
    ) -> Self {
        Self {
            store,
            storage,
            cipher,
        }
    }

    /// Fetch a single backup by id, decrypting if it is encrypted at rest.
    #[tracing::instrument(skip(self), fields(backup_id = %backup_id))]
    pub async fn fetch_one(&self, backup_id: Uuid) -> Result<FetchedBackup, AppError> {
        let record = self
            .store
            .get(backup_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", backup_id)))?;

        let data = self.read_plaintext(&record).await?;
        Ok(FetchedBackup {
            data,
            filename: record.original_filename,
            tenant_id: record.tenant_id,
        })
    }

    /// List a tenant's backups within an inclusive calendar-date range,
    /// newest first.
    #[tracing::instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn list(
        &self,
        tenant_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<BackupRecord>, AppError> {
        self.store.list_for_tenant(tenant_id, range).await
    }

    /// Bundle a tenant's backups within a date range into an in-memory zip
    /// archive. Encrypted members are decrypted before insertion; the
    /// archive never contains ciphertext. An empty match is `NotFound`.
    #[tracing::instrument(skip(self), fields(tenant_code = %tenant.code))]
    pub async fn fetch_bundle(
        &self,
        tenant: &Tenant,
        range: DateRange,
    ) -> Result<Vec<u8>, AppError> {
        use zip::write::{FileOptions, ZipWriter};
        use zip::CompressionMethod;

        let records = self.store.list_for_tenant(tenant.id, range).await?;
        if records.is_empty() {
            return Err(AppError::NotFound(format!(
                "No backups found for tenant {} in the requested range",
                tenant.code
            )));
        }

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            for record in &records {
                let data = self.read_plaintext(record).await?;

                let entry_name = format!(
                    "{}/{}",
                    tenant.code,
                    archive_entry_name(&record.original_filename, record.id)
                );
                zip.start_file(&entry_name, options)
                    .map_err(|e| AppError::Internal(format!("Failed to add archive entry: {}", e)))?;
                zip.write_all(&data)
                    .map_err(|e| AppError::Internal(format!("Failed to write archive entry: {}", e)))?;
            }

            zip.finish()
                .map_err(|e| AppError::Internal(format!("Failed to finalize archive: {}", e)))?;
        }

        tracing::info!(
            tenant_code = %tenant.code,
            members = records.len(),
            archive_bytes = buffer.len(),
            "Backup bundle assembled"
        );
        Ok(buffer)
    }

    /// Remove a backup record and its storage object. The record goes
    /// first; losing the object-delete afterwards leaves an orphaned file,
    /// never a record pointing at nothing.
    #[tracing::instrument(skip(self), fields(backup_id = %backup_id))]
    pub async fn delete_backup(&self, backup_id: Uuid) -> Result<BackupRecord, AppError> {
        let record = self
            .store
            .delete(backup_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", backup_id)))?;

        if let Err(e) = self.storage.delete(&record.storage_key).await {
            tracing::warn!(
                backup_id = %record.id,
                storage_key = %record.storage_key,
                error = %e,
                "Backup record deleted but storage object removal failed; object orphaned"
            );
        }

        Ok(record)
    }

    /// Read a record's object and return the plaintext bytes, decrypting
    /// on a blocking thread when the record is flagged encrypted.
    async fn read_plaintext(&self, record: &BackupRecord) -> Result<Vec<u8>, AppError> {
        let data = self.storage.read(&record.storage_key).await?;
        if !record.is_encrypted {
            return Ok(data);
        }

        let cipher = self.cipher.clone();
        tokio::task::spawn_blocking(move || cipher.decrypt(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Decryption task failed: {}", e)))?
    }
}

/// Base name for an archive entry; traversal components fall back to an
/// id-derived name.
fn archive_entry_name(filename: &str, backup_id: Uuid) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("backup_{}", backup_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_entry_name_strips_traversal() {
        let id = Uuid::new_v4();
        assert_eq!(archive_entry_name("../../etc/passwd", id), "passwd");
        assert_eq!(archive_entry_name("dump.sql", id), "dump.sql");
        assert_eq!(archive_entry_name("..", id), format!("backup_{}", id));
        assert_eq!(archive_entry_name("", id), format!("backup_{}", id));
    }
}
