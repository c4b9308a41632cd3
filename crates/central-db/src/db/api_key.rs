//! API key repository: lookups for the api_keys table.
//!
//! Raw keys are never stored; only an argon2 hash plus a short prefix used
//! to find candidate rows before verification.

use central_core::AppError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// API key stored in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub key_hash: String,
    pub key_prefix: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for the api_keys table.
#[derive(Clone)]
pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, key_hash), fields(db.table = "api_keys", db.operation = "insert"))]
    pub async fn create(
        &self,
        tenant_id: Uuid,
        name: &str,
        key_hash: &str,
        key_prefix: &str,
    ) -> Result<ApiKey, AppError> {
        let key: ApiKey = sqlx::query_as::<Postgres, ApiKey>(
            r#"
            INSERT INTO api_keys (id, tenant_id, name, key_hash, key_prefix, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW())
            RETURNING id, tenant_id, name, key_hash, key_prefix, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(name)
        .bind(key_hash)
        .bind(key_prefix)
        .fetch_one(&self.pool)
        .await?;
        Ok(key)
    }

    /// Candidate keys for a raw key's prefix; callers verify the hash.
    #[tracing::instrument(skip(self), fields(db.table = "api_keys"))]
    pub async fn find_active_by_prefix(&self, key_prefix: &str) -> Result<Vec<ApiKey>, AppError> {
        let keys: Vec<ApiKey> = sqlx::query_as::<Postgres, ApiKey>(
            r#"
            SELECT id, tenant_id, name, key_hash, key_prefix, is_active, created_at
            FROM api_keys
            WHERE key_prefix = $1 AND is_active = TRUE
            "#,
        )
        .bind(key_prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    /// Returns false when no active key with this id exists.
    #[tracing::instrument(skip(self), fields(db.table = "api_keys", db.operation = "update", key_id = %id))]
    pub async fn deactivate(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
