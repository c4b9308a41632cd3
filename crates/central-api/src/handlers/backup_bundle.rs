use crate::auth::models::AuthPrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{resolve_tenant, DateRangeQuery};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use central_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/tenants/{id}/backups/archive",
    tag = "backups",
    params(
        ("id" = Uuid, Path, description = "Tenant ID"),
        ("start_date" = Option<String>, Query, description = "Inclusive lower bound (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Inclusive upper bound (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Zip archive of matching backups", content_type = "application/zip"),
        (status = 404, description = "Tenant not found or no backups in range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal), fields(tenant_id = %id, operation = "bundle_backups"))]
pub async fn bundle_backups(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tenant = resolve_tenant(&state, &principal, id).await?;

    let archive = state.retrieval.fetch_bundle(&tenant, query.into()).await?;

    let content_disposition = format!("attachment; filename=\"{}_backups.zip\"", tenant.code);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .body(Body::from(archive))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
