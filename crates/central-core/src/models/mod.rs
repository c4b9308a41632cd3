pub mod backup;
pub mod tenant;

pub use backup::{BackupRecord, BackupResponse};
pub use tenant::Tenant;
