//! Backup ingestion pipeline.
//!
//! An upload moves through fixed stages: stage to a temp key, measure and
//! hash, persist the record, relocate to the tenant's permanent key, then
//! encrypt in place. Size and checksum are frozen before encryption and
//! always describe the plaintext. Encryption is the only non-fatal stage:
//! a backup that could not be encrypted is still a valid backup, stored in
//! plaintext with `is_encrypted = false`.

use central_core::models::{BackupRecord, Tenant};
use central_core::{AppError, BackupCipher, StreamingChecksum};
use central_db::BackupStore;
use central_storage::{keys, Relocator, Storage};
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use uuid::Uuid;

/// Runs the ingestion pipeline for uploaded backup files.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn BackupStore>,
    storage: Arc<dyn Storage>,
    relocator: Relocator,
    cipher: BackupCipher,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn BackupStore>,
        storage: Arc<dyn Storage>,
        cipher: BackupCipher,
    ) -> Self {
        let relocator = Relocator::new(storage.clone());
        Self {
            store,
            storage,
            relocator,
            cipher,
        }
    }

    /// Ingest one uploaded backup for a tenant.
    ///
    /// Returns the persisted record. `storage_key` on the returned record
    /// reflects how far the pipeline got: permanent key with the encryption
    /// suffix on full success, plain permanent key if encryption failed.
    #[tracing::instrument(skip(self, data), fields(tenant_code = %tenant.code, filename = %filename, size_bytes = data.len()))]
    pub async fn ingest(
        &self,
        tenant: &Tenant,
        filename: &str,
        data: Vec<u8>,
        remarks: Option<String>,
    ) -> Result<BackupRecord, AppError> {
        if data.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
        }
        let safe_filename = keys::sanitize_filename(filename);
        if safe_filename == "invalid_filename" {
            return Err(AppError::InvalidInput(format!(
                "Invalid filename: {}",
                filename
            )));
        }

        // Stage at a request-scoped temp key, then measure and hash the
        // staged object rather than the request body.
        let upload_id = Uuid::new_v4();
        let temp_key = keys::temp_key(upload_id, &safe_filename);
        self.storage.write(&temp_key, data).await?;

        let record = match self.build_record(tenant, &temp_key, &safe_filename, remarks).await {
            Ok(record) => record,
            Err(e) => {
                self.cleanup_temp(&temp_key).await;
                return Err(e);
            }
        };

        if let Err(e) = self.store.create(&record).await {
            self.cleanup_temp(&temp_key).await;
            return Err(e);
        }

        let mut record = self.relocate_to_permanent(tenant, record).await?;

        match self.encrypt_in_place(&record).await {
            Ok(new_key) => {
                record.storage_key = new_key;
                record.is_encrypted = true;
            }
            Err(e) => {
                // Non-fatal: the backup stays stored in plaintext.
                tracing::warn!(
                    backup_id = %record.id,
                    error = %e,
                    "Backup encryption failed; object remains in plaintext"
                );
            }
        }

        tracing::info!(
            backup_id = %record.id,
            storage_key = %record.storage_key,
            size_bytes = record.file_size,
            encrypted = record.is_encrypted,
            "Backup ingested"
        );
        Ok(record)
    }

    /// Size from the staged object, checksum by streaming it in bounded
    /// chunks. Both are frozen here, before encryption.
    async fn build_record(
        &self,
        tenant: &Tenant,
        temp_key: &str,
        safe_filename: &str,
        remarks: Option<String>,
    ) -> Result<BackupRecord, AppError> {
        let file_size = self.storage.content_length(temp_key).await?;

        let mut stream = self.storage.read_stream(temp_key).await?;
        let mut checksum = StreamingChecksum::new();
        while let Some(chunk) = stream.next().await {
            checksum.update(&chunk?);
        }

        Ok(BackupRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant.id,
            storage_key: temp_key.to_string(),
            original_filename: safe_filename.to_string(),
            file_size: file_size as i64,
            checksum: checksum.finalize(),
            is_encrypted: false,
            remarks,
            uploaded_at: Utc::now(),
        })
    }

    /// Move the staged object to the tenant's permanent key and repoint the
    /// record. On relocation failure the record stays valid at the temp key.
    async fn relocate_to_permanent(
        &self,
        tenant: &Tenant,
        mut record: BackupRecord,
    ) -> Result<BackupRecord, AppError> {
        let mut permanent =
            keys::backup_key(&tenant.code, record.uploaded_at, &record.original_filename);
        if self.storage.exists(&permanent).await? {
            // Same tenant, same second, same filename: disambiguate with the record id.
            permanent = keys::backup_key_with_id(
                &tenant.code,
                record.uploaded_at,
                record.id,
                &record.original_filename,
            );
        }

        let temp_key = record.storage_key.clone();
        self.relocator.relocate(&temp_key, &permanent).await?;

        if let Err(e) = self.store.set_storage_key(record.id, &permanent).await {
            // The temp object is gone; move the bytes back so the record
            // still points at something real before surfacing the error.
            if let Err(restore_err) = self.relocator.relocate(&permanent, &temp_key).await {
                tracing::error!(
                    backup_id = %record.id,
                    storage_key = %permanent,
                    error = %restore_err,
                    "Failed to restore staged object after record update failure"
                );
            }
            return Err(e);
        }

        record.storage_key = permanent;
        Ok(record)
    }

    /// Encrypt the permanent object in place and flip the record to the
    /// suffixed key. Returns the new storage key.
    async fn encrypt_in_place(&self, record: &BackupRecord) -> Result<String, AppError> {
        let plaintext = self.storage.read(&record.storage_key).await?;
        let cipher = self.cipher.clone();
        let (plaintext, ciphertext) = tokio::task::spawn_blocking(move || {
            let ciphertext = cipher.encrypt(&plaintext)?;
            Ok::<_, AppError>((plaintext, ciphertext))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Encryption task failed: {}", e)))??;

        let new_key = self
            .relocator
            .replace_with_encrypted(&record.storage_key, ciphertext)
            .await?;

        if let Err(e) = self.store.mark_encrypted(record.id, &new_key).await {
            // Put the plaintext back so the record keeps pointing at real
            // bytes, then drop the now-unreferenced ciphertext.
            match self.storage.write(&record.storage_key, plaintext).await {
                Ok(()) => {
                    let _ = self.storage.delete(&new_key).await;
                }
                Err(restore_err) => {
                    tracing::error!(
                        backup_id = %record.id,
                        storage_key = %record.storage_key,
                        error = %restore_err,
                        "Failed to restore plaintext after record update failure"
                    );
                }
            }
            return Err(e);
        }

        Ok(new_key)
    }

    async fn cleanup_temp(&self, temp_key: &str) {
        if let Err(e) = self.storage.delete(temp_key).await {
            tracing::warn!(key = %temp_key, error = %e, "Failed to clean up staged upload");
        }
    }
}
