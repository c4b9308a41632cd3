//! Tenant repository: lookups for the tenants table.

use central_core::models::Tenant;
use central_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Repository for the tenants table.
#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "insert"))]
    pub async fn create(&self, name: &str, code: &str) -> Result<Tenant, AppError> {
        let tenant: Tenant = sqlx::query_as::<Postgres, Tenant>(
            r#"
            INSERT INTO tenants (id, name, code, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, name, code, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.record_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant: Option<Tenant> = sqlx::query_as::<Postgres, Tenant>(
            "SELECT id, name, code, created_at, updated_at FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants"))]
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Tenant>, AppError> {
        let tenant: Option<Tenant> = sqlx::query_as::<Postgres, Tenant>(
            "SELECT id, name, code, created_at, updated_at FROM tenants WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants"))]
    pub async fn list(&self) -> Result<Vec<Tenant>, AppError> {
        let tenants: Vec<Tenant> = sqlx::query_as::<Postgres, Tenant>(
            "SELECT id, name, code, created_at, updated_at FROM tenants ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }
}
