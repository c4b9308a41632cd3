//! Shared fixtures for pipeline tests: an in-memory record store, a local
//! storage backend on a tempdir, and a storage wrapper whose failure modes
//! can be toggled per test.
#![allow(dead_code)]

use async_trait::async_trait;
use central_core::models::{BackupRecord, Tenant};
use central_core::{AppError, BackupCipher};
use central_db::{BackupStore, DateRange};
use central_services::{IngestService, RetrievalService};
use central_storage::{ByteStream, LocalStorage, Storage, StorageError, StorageResult};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

/// In-memory `BackupStore` so pipeline tests run without Postgres.
#[derive(Default)]
pub struct MemoryBackupStore {
    records: Mutex<HashMap<Uuid, BackupRecord>>,
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: BackupRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn all(&self) -> Vec<BackupRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn create(&self, record: &BackupRecord) -> Result<(), AppError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn set_storage_key(&self, id: Uuid, storage_key: &str) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", id)))?;
        record.storage_key = storage_key.to_string();
        Ok(())
    }

    async fn mark_encrypted(&self, id: Uuid, storage_key: &str) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", id)))?;
        record.storage_key = storage_key.to_string();
        record.is_encrypted = true;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<BackupRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<BackupRecord>, AppError> {
        let mut records: Vec<BackupRecord> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.tenant_id == tenant_id && range.contains(r.uploaded_at.date_naive()))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<BackupRecord>, AppError> {
        Ok(self.records.lock().unwrap().remove(&id))
    }
}

/// Local storage wrapper with toggleable failure modes: `copy` (breaks
/// relocation) and writes to encrypted keys (breaks the encryption stage).
pub struct FlakyStorage {
    inner: LocalStorage,
    pub fail_copy: AtomicBool,
    pub fail_encrypted_writes: AtomicBool,
}

impl FlakyStorage {
    pub fn new(inner: LocalStorage) -> Self {
        Self {
            inner,
            fail_copy: AtomicBool::new(false),
            fail_encrypted_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        if self.fail_encrypted_writes.load(Ordering::SeqCst) && key.ends_with(".enc") {
            return Err(StorageError::WriteFailed("injected write failure".to_string()));
        }
        self.inner.write(key, data).await
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(key).await
    }

    async fn read_stream(&self, key: &str) -> StorageResult<ByteStream> {
        self.inner.read_stream(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn content_length(&self, key: &str) -> StorageResult<u64> {
        self.inner.content_length(key).await
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        if self.fail_copy.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("injected copy failure".to_string()));
        }
        self.inner.copy(from_key, to_key).await
    }
}

pub fn test_cipher() -> BackupCipher {
    BackupCipher::from_key_bytes(b"01234567890123456789012345678901").unwrap()
}

pub fn test_tenant(code: &str) -> Tenant {
    let now = Utc::now();
    Tenant {
        id: Uuid::new_v4(),
        name: format!("{} College", code),
        code: code.to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub struct TestHarness {
    pub dir: TempDir,
    pub store: Arc<MemoryBackupStore>,
    pub storage: Arc<FlakyStorage>,
    pub ingest: IngestService,
    pub retrieval: RetrievalService,
}

pub async fn harness() -> TestHarness {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalStorage::new(dir.path()).await.unwrap();
    let storage = Arc::new(FlakyStorage::new(local));
    let store = Arc::new(MemoryBackupStore::new());
    let cipher = test_cipher();

    let storage_dyn: Arc<dyn Storage> = storage.clone();
    let store_dyn: Arc<dyn BackupStore> = store.clone();
    let ingest = IngestService::new(store_dyn.clone(), storage_dyn.clone(), cipher.clone());
    let retrieval = RetrievalService::new(store_dyn, storage_dyn, cipher);

    TestHarness {
        dir,
        store,
        storage,
        ingest,
        retrieval,
    }
}
