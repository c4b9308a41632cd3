use crate::auth::models::AuthPrincipal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use central_core::models::BackupResponse;
use central_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/v0/backups",
    tag = "backups",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Backup ingested", body = BackupResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_backup(
    State(state): State<Arc<AppState>>,
    principal: AuthPrincipal,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BackupResponse>), HttpAppError> {
    // Uploads are always attributed to the key's own tenant; the master key
    // has no tenant to attribute to.
    let tenant = principal.tenant().cloned().ok_or_else(|| {
        AppError::Unauthorized("Uploading requires a tenant API key".to_string())
    })?;

    let mut filename: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;
    let mut remarks: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart request: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                if bytes.len() > state.config.max_backup_size_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "{} bytes exceeds max {} bytes",
                        bytes.len(),
                        state.config.max_backup_size_bytes
                    ))
                    .into());
                }
                data = Some(bytes.to_vec());
            }
            Some("remarks") => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read remarks: {}", e))
                })?;
                if !text.trim().is_empty() {
                    remarks = Some(text);
                }
            }
            _ => {}
        }
    }

    let filename =
        filename.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;
    let data = data.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;

    let record = state.ingest.ingest(&tenant, &filename, data, remarks).await?;

    Ok((StatusCode::CREATED, Json(BackupResponse::from(record))))
}
