//! Database repositories for the data access layer
//!
//! Repositories are organized under db/: backup records, tenants, and API
//! keys. Each repository owns one table and provides CRUD plus the
//! specialized queries the services need. The `BackupStore` trait is the
//! seam the pipeline depends on, so it can be exercised without Postgres.

pub mod db;
pub mod store;

pub use db::{ApiKey, ApiKeyRepository, BackupRepository, TenantRepository};
pub use store::{BackupStore, DateRange};
