use crate::auth::models::AuthPrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use central_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/backups/{id}/file",
    tag = "backups",
    params(
        ("id" = Uuid, Path, description = "Backup ID")
    ),
    responses(
        (status = 200, description = "Backup file", content_type = "application/octet-stream"),
        (status = 404, description = "Backup not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal), fields(backup_id = %id, operation = "download_backup"))]
pub async fn download_backup(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let fetched = state.retrieval.fetch_one(id).await?;

    // A college key only sees its own backups; a foreign id reads as missing.
    if let Some(tenant) = principal.tenant() {
        if fetched.tenant_id != tenant.id {
            return Err(AppError::NotFound(format!("Backup {} not found", id)).into());
        }
    }

    let content_disposition = format!("attachment; filename=\"{}\"", fetched.filename);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .body(Body::from(fetched.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
