//! Shared key generation for storage backends.
//!
//! Permanent layout: `{tenant_code}/{YYYY-MM-DD_HH-MM-SS}_{filename}`, with
//! the encryption suffix appended once the object is encrypted at rest.
//! Two uploads of the same filename in the same second would collide, so
//! the pipeline falls back to a variant carrying the record id.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Suffix appended to a key after its object has been encrypted
pub const ENCRYPTED_SUFFIX: &str = ".enc";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Staging key for a not-yet-attributed upload: `tmp/{upload_id}/{filename}`.
pub fn temp_key(upload_id: Uuid, filename: &str) -> String {
    format!("tmp/{}/{}", upload_id, filename)
}

/// Permanent key for a tenant's backup: `{code}/{timestamp}_{filename}`.
pub fn backup_key(tenant_code: &str, uploaded_at: DateTime<Utc>, filename: &str) -> String {
    format!(
        "{}/{}_{}",
        tenant_code,
        uploaded_at.format(TIMESTAMP_FORMAT),
        filename
    )
}

/// Collision-safe permanent key carrying the record id:
/// `{code}/{timestamp}_{record_id}_{filename}`. Used when [`backup_key`]
/// is already taken (same tenant, same second, same filename).
pub fn backup_key_with_id(
    tenant_code: &str,
    uploaded_at: DateTime<Utc>,
    record_id: Uuid,
    filename: &str,
) -> String {
    format!(
        "{}/{}_{}_{}",
        tenant_code,
        uploaded_at.format(TIMESTAMP_FORMAT),
        record_id,
        filename
    )
}

/// Key for the encrypted form of an object.
pub fn encrypted_key(key: &str) -> String {
    format!("{}{}", key, ENCRYPTED_SUFFIX)
}

/// Strip the encryption suffix from a filename or key, if present.
pub fn strip_encrypted_suffix(name: &str) -> &str {
    name.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(name)
}

/// Sanitize an uploaded filename for use inside a storage key.
/// Strips path components, rejects traversal, and replaces characters
/// outside a conservative allowlist.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim().is_empty() {
        "file".to_string()
    } else {
        s
    }
}
