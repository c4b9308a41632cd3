//! Service and repository initialization

use crate::state::AppState;
use anyhow::{Context, Result};
use central_core::{BackupCipher, Config};
use central_db::{ApiKeyRepository, BackupRepository, BackupStore, TenantRepository};
use central_services::{IngestService, RetrievalService};
use central_storage::{LocalStorage, Storage};
use sqlx::PgPool;
use std::sync::Arc;

/// Wire repositories, the cipher, and the two services into AppState.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    local_storage: LocalStorage,
) -> Result<Arc<AppState>> {
    // A missing or malformed encryption key is a startup failure, never a
    // per-request one.
    let cipher = BackupCipher::from_env().context("Failed to load backup encryption key")?;

    let storage: Arc<dyn Storage> = Arc::new(local_storage);
    let store: Arc<dyn BackupStore> = Arc::new(BackupRepository::new(pool.clone()));

    let ingest = IngestService::new(store.clone(), storage.clone(), cipher.clone());
    let retrieval = RetrievalService::new(store, storage.clone(), cipher);

    let state = AppState {
        config: config.clone(),
        pool: pool.clone(),
        tenant_repository: TenantRepository::new(pool.clone()),
        api_key_repository: ApiKeyRepository::new(pool),
        storage,
        ingest,
        retrieval,
    };

    tracing::info!("Services initialized");

    Ok(Arc::new(state))
}
