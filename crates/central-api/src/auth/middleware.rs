//! Api-Key authentication middleware.
//!
//! Callers send `Authorization: Api-Key <key>`. The operator master key is
//! compared in constant time; college keys are located by prefix and
//! verified against their argon2 hash. The resolved principal lands in
//! request extensions for handlers to extract.

use crate::auth::api_key::{extract_key_prefix, verify_api_key, API_KEY_PREFIX};
use crate::auth::models::AuthPrincipal;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use central_core::AppError;
use central_db::{ApiKeyRepository, TenantRepository};
use std::sync::Arc;
use subtle::ConstantTimeEq;

const AUTH_SCHEME: &str = "Api-Key ";

#[derive(Clone)]
pub struct AuthState {
    pub master_api_key: Option<String>,
    pub api_key_repository: ApiKeyRepository,
    pub tenant_repository: TenantRepository,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match auth_header.strip_prefix(AUTH_SCHEME) {
        Some(t) => t.trim(),
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Invalid authorization header format; expected 'Api-Key <key>'".to_string(),
            ))
            .into_response();
        }
    };

    if let Some(ref master) = auth_state.master_api_key {
        if secure_compare(token, master) {
            request.extensions_mut().insert(AuthPrincipal::Operator);
            return next.run(request).await;
        }
    }

    if token.starts_with(API_KEY_PREFIX) {
        match authenticate_tenant_key(
            token,
            &auth_state.api_key_repository,
            &auth_state.tenant_repository,
        )
        .await
        {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
                return next.run(request).await;
            }
            Err(e) => {
                return HttpAppError(AppError::Unauthorized(e.to_string())).into_response();
            }
        }
    }

    HttpAppError(AppError::Unauthorized("Invalid API key".to_string())).into_response()
}

async fn authenticate_tenant_key(
    token: &str,
    api_key_repo: &ApiKeyRepository,
    tenant_repo: &TenantRepository,
) -> Result<AuthPrincipal, AppError> {
    let prefix = extract_key_prefix(token);
    let candidates = api_key_repo.find_active_by_prefix(&prefix).await?;

    for api_key in candidates {
        if verify_api_key(token, &api_key.key_hash)? {
            let tenant = tenant_repo
                .get_by_id(api_key.tenant_id)
                .await?
                .ok_or_else(|| AppError::Internal("Tenant not found for API key".to_string()))?;

            return Ok(AuthPrincipal::Tenant(tenant));
        }
    }

    Err(AppError::Unauthorized("Invalid API key".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("same-key", "same-key"));
        assert!(!secure_compare("same-key", "other-key"));
        assert!(!secure_compare("short", "short-but-longer"));
    }
}
