//! OpenAPI document for the backup API.

use crate::error::ErrorResponse;
use crate::handlers;
use crate::handlers::admin::{CreateApiKeyRequest, CreateApiKeyResponse, CreateTenantRequest};
use central_core::models::{BackupResponse, Tenant};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::backup_upload::upload_backup,
        handlers::backup_download::download_backup,
        handlers::backup_list::list_backups,
        handlers::backup_bundle::bundle_backups,
        handlers::backup_delete::delete_backup,
        handlers::admin::create_tenant,
        handlers::admin::list_tenants,
        handlers::admin::create_api_key,
        handlers::admin::revoke_api_key,
    ),
    components(schemas(
        BackupResponse,
        ErrorResponse,
        Tenant,
        CreateTenantRequest,
        CreateApiKeyRequest,
        CreateApiKeyResponse
    )),
    tags(
        (name = "backups", description = "Backup ingestion and retrieval"),
        (name = "admin", description = "Operator provisioning of tenants and API keys")
    )
)]
pub struct ApiDoc;
