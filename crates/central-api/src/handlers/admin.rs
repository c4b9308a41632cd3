//! Operator provisioning handlers.
//!
//! Create and list tenants, issue tenant API keys, and revoke keys. All of
//! these require the master API key; the raw key is returned exactly once at
//! creation and only its argon2 hash is stored.

use crate::auth::api_key::{extract_key_prefix, generate_api_key, hash_api_key};
use crate::auth::models::AuthPrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use central_core::models::Tenant;
use central_core::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTenantRequest {
    pub name: String,
    /// Short, filesystem-safe identifier used in storage keys
    #[schema(example = "ABC")]
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// Response for API key creation - the only time the raw key is visible.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateApiKeyResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// The raw key. Shown once; store it securely.
    pub api_key: String,
    pub name: String,
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
}

fn require_operator(principal: &AuthPrincipal) -> Result<(), AppError> {
    if !principal.is_operator() {
        return Err(AppError::Unauthorized(
            "Provisioning requires the master API key".to_string(),
        ));
    }
    Ok(())
}

fn validate_tenant_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() || code.len() > 16 {
        return Err(AppError::InvalidInput(
            "Tenant code must be 1-16 characters".to_string(),
        ));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::InvalidInput(
            "Tenant code may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v0/tenants",
    tag = "admin",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = Tenant),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal, request))]
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<Tenant>), HttpAppError> {
    require_operator(&principal)?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()).into());
    }
    validate_tenant_code(&request.code)?;

    if state
        .tenant_repository
        .get_by_code(&request.code)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidInput(format!(
            "Tenant code '{}' is already in use",
            request.code
        ))
        .into());
    }

    let tenant = state.tenant_repository.create(name, &request.code).await?;
    tracing::info!(tenant_id = %tenant.id, code = %tenant.code, "Tenant created");

    Ok((StatusCode::CREATED, Json(tenant)))
}

#[utoipa::path(
    get,
    path = "/api/v0/tenants",
    tag = "admin",
    responses(
        (status = 200, description = "All tenants", body = Vec<Tenant>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal))]
pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
) -> Result<Json<Vec<Tenant>>, HttpAppError> {
    require_operator(&principal)?;
    let tenants = state.tenant_repository.list().await?;
    Ok(Json(tenants))
}

#[utoipa::path(
    post,
    path = "/api/v0/tenants/{id}/api-keys",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "API key created", body = CreateApiKeyResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tenant not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal, request))]
pub async fn create_api_key(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreateApiKeyResponse>), HttpAppError> {
    require_operator(&principal)?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()).into());
    }

    let tenant = state
        .tenant_repository
        .get_by_id(tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id)))?;

    let raw_key = generate_api_key();
    let key_hash = hash_api_key(&raw_key)?;
    let key_prefix = extract_key_prefix(&raw_key);

    let api_key = state
        .api_key_repository
        .create(tenant.id, name, &key_hash, &key_prefix)
        .await?;
    tracing::info!(tenant_id = %tenant.id, key_id = %api_key.id, "API key created");

    Ok((
        StatusCode::CREATED,
        Json(CreateApiKeyResponse {
            id: api_key.id,
            tenant_id: api_key.tenant_id,
            api_key: raw_key,
            name: api_key.name,
            key_prefix: api_key.key_prefix,
            created_at: api_key.created_at,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v0/api-keys/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses(
        (status = 204, description = "API key revoked"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "API key not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal))]
pub async fn revoke_api_key(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    require_operator(&principal)?;

    let revoked = state.api_key_repository.deactivate(id).await?;
    if !revoked {
        return Err(AppError::NotFound(
            "API key not found or already revoked".to_string(),
        )
        .into());
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tenant_code() {
        assert!(validate_tenant_code("ABC").is_ok());
        assert!(validate_tenant_code("north-campus_2").is_ok());
        assert!(validate_tenant_code("").is_err());
        assert!(validate_tenant_code("has space").is_err());
        assert!(validate_tenant_code("slash/y").is_err());
        assert!(validate_tenant_code("a-code-longer-than-sixteen").is_err());
    }
}
