use crate::auth::models::AuthPrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use central_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/v0/backups/{id}",
    tag = "backups",
    params(
        ("id" = Uuid, Path, description = "Backup ID")
    ),
    responses(
        (status = 204, description = "Backup deleted"),
        (status = 401, description = "Master API key required", body = ErrorResponse),
        (status = 404, description = "Backup not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal), fields(backup_id = %id, operation = "delete_backup"))]
pub async fn delete_backup(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    if !principal.is_operator() {
        return Err(
            AppError::Unauthorized("Deleting backups requires the master API key".to_string())
                .into(),
        );
    }

    state.retrieval.delete_backup(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
