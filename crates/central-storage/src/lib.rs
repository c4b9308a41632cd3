//! Central Storage Library
//!
//! Storage abstraction and the local filesystem backend for backup
//! artifacts, plus the relocator that moves an object between two logical
//! keys without ever leaving a record pointing at missing bytes.
//!
//! # Storage key format
//!
//! Keys are tenant-scoped once a backup has been attributed:
//!
//! - **Staging**: `tmp/{upload_id}/{filename}`
//! - **Permanent**: `{tenant_code}/{YYYY-MM-DD_HH-MM-SS}_{filename}`
//! - **Encrypted**: the permanent key with a `.enc` suffix
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so every caller stays consistent.

pub mod keys;
pub mod local;
pub mod relocate;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use relocate::Relocator;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
