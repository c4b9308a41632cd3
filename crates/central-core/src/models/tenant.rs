use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Tenant (college) entity.
///
/// The core consumes tenants as an opaque identity: an id plus the short
/// `code` used to build storage keys. Directory management (users, roles,
/// logins) lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// Short, filesystem-safe identifier used in storage keys
    #[schema(example = "ABC")]
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
