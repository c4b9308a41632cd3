//! Atomic-as-possible relocation of objects between storage keys.
//!
//! Both operations follow write-new, confirm, delete-old. The source is
//! never touched until the destination is confirmed readable with the
//! expected length, so a failed call leaves the previous state intact.

use crate::keys;
use crate::traits::{Storage, StorageError, StorageResult};
use std::sync::Arc;

/// Moves objects between logical keys within one storage backend.
#[derive(Clone)]
pub struct Relocator {
    storage: Arc<dyn Storage>,
}

impl Relocator {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Move the object at `from` to `to`. After success, `to` holds the
    /// exact bytes formerly at `from` and `from` is gone. On failure the
    /// source object is untouched.
    pub async fn relocate(&self, from: &str, to: &str) -> StorageResult<String> {
        let expected = self.storage.content_length(from).await?;

        self.storage.copy(from, to).await?;
        self.confirm(to, expected).await?;

        // The destination is authoritative from here; a failed source
        // delete leaves harmless garbage, not a broken record.
        if let Err(e) = self.storage.delete(from).await {
            tracing::warn!(from = %from, to = %to, error = %e, "Relocation source delete failed; leaving stale object");
        }

        tracing::debug!(from = %from, to = %to, size_bytes = expected, "Relocation complete");
        Ok(to.to_string())
    }

    /// Replace the object at `key` with `new_data` under the encrypted
    /// key variant. The plaintext object is only removed once the new
    /// object is confirmed written; returns the new key.
    pub async fn replace_with_encrypted(
        &self,
        key: &str,
        new_data: Vec<u8>,
    ) -> StorageResult<String> {
        let new_key = keys::encrypted_key(key);
        let expected = new_data.len() as u64;

        self.storage.write(&new_key, new_data).await?;
        if let Err(e) = self.confirm(&new_key, expected).await {
            // Roll back the half-written ciphertext; the plaintext at `key`
            // is still the object of record.
            let _ = self.storage.delete(&new_key).await;
            return Err(e);
        }

        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, new_key = %new_key, error = %e, "Plaintext delete after encryption failed; leaving stale object");
        }

        Ok(new_key)
    }

    async fn confirm(&self, key: &str, expected_len: u64) -> StorageResult<()> {
        if !self.storage.exists(key).await? {
            return Err(StorageError::WriteFailed(format!(
                "Destination {} missing after write",
                key
            )));
        }
        let written = self.storage.content_length(key).await?;
        if written != expected_len {
            return Err(StorageError::WriteFailed(format!(
                "Destination {} has {} bytes, expected {}",
                key, written, expected_len
            )));
        }
        Ok(())
    }
}
