pub mod api_key;
pub mod backup;
pub mod tenant;

pub use api_key::{ApiKey, ApiKeyRepository};
pub use backup::BackupRepository;
pub use tenant::TenantRepository;
