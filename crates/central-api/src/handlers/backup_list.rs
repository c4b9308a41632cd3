use crate::auth::models::AuthPrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{resolve_tenant, DateRangeQuery};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use central_core::models::BackupResponse;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/tenants/{id}/backups",
    tag = "backups",
    params(
        ("id" = Uuid, Path, description = "Tenant ID"),
        ("start_date" = Option<String>, Query, description = "Inclusive lower bound (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Inclusive upper bound (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Backups for the tenant, newest first", body = [BackupResponse]),
        (status = 404, description = "Tenant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, principal), fields(tenant_id = %id, operation = "list_backups"))]
pub async fn list_backups(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<BackupResponse>>, HttpAppError> {
    let tenant = resolve_tenant(&state, &principal, id).await?;

    let records = state.retrieval.list(tenant.id, query.into()).await?;
    let responses: Vec<BackupResponse> = records.into_iter().map(BackupResponse::from).collect();

    Ok(Json(responses))
}
