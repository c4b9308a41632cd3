//! Storage backend setup

use anyhow::{Context, Result};
use central_core::Config;
use central_storage::LocalStorage;

/// Setup the local filesystem storage backend
pub async fn setup_storage(config: &Config) -> Result<LocalStorage> {
    let storage = LocalStorage::new(&config.local_storage_path)
        .await
        .with_context(|| {
            format!(
                "Failed to initialize local storage at {}",
                config.local_storage_path
            )
        })?;

    tracing::info!(
        path = %config.local_storage_path,
        "Local storage backend ready"
    );

    Ok(storage)
}
