//! Central Core Library
//!
//! This crate provides the domain models, error types, configuration, content
//! hashing, and the backup cipher shared across all Central components.

pub mod checksum;
pub mod cipher;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use checksum::{sha256_hex, sha256_hex_stream, StreamingChecksum};
pub use cipher::BackupCipher;
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
