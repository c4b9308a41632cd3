//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. The service assumes strong read-after-write consistency and
//! atomic single-object writes from any backend plugged in here.

use async_trait::async_trait;
use bytes::Bytes;
use central_core::AppError;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => {
                AppError::NotFound(format!("Storage object not found: {}", key))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Byte stream returned by [`Storage::read_stream`]
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// All storage backends must implement this trait. Keys are logical paths
/// computed by callers via the `keys` module; backends never invent keys.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a whole object at the given key, creating parent scopes as needed.
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Read a whole object by key.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Read an object as a stream of chunks (for hashing large files
    /// without a second full copy in memory).
    async fn read_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the size in bytes of an object.
    async fn content_length(&self, key: &str) -> StorageResult<u64>;

    /// Copy an object to a new key, leaving the source in place.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()>;
}
