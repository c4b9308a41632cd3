use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use central_core::models::Tenant;

/// Authenticated caller, extracted by the auth middleware and stored in
/// request extensions. Colleges authenticate with their own API key;
/// operators with the master key.
#[derive(Debug, Clone)]
pub enum AuthPrincipal {
    /// A college identified by one of its active API keys.
    Tenant(Tenant),
    /// The operator master key; may act across tenants.
    Operator,
}

impl AuthPrincipal {
    /// The tenant this principal is scoped to, if any.
    pub fn tenant(&self) -> Option<&Tenant> {
        match self {
            AuthPrincipal::Tenant(tenant) => Some(tenant),
            AuthPrincipal::Operator => None,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, AuthPrincipal::Operator)
    }
}

// Extract directly from request parts so handlers taking Multipart can
// still receive the principal (Extension cannot be combined with Multipart).
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthPrincipal>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new(
                        "Missing authentication context",
                        "MISSING_AUTH_CONTEXT",
                    )),
                )
            })
    }
}
