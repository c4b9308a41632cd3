//! HTTP handlers for the backup API.

pub mod admin;
pub mod backup_bundle;
pub mod backup_delete;
pub mod backup_download;
pub mod backup_list;
pub mod backup_upload;

use crate::auth::models::AuthPrincipal;
use crate::state::AppState;
use central_core::models::Tenant;
use central_core::AppError;
use central_db::DateRange;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

/// Inclusive calendar-date filter on upload time, from query parameters.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<DateRangeQuery> for DateRange {
    fn from(query: DateRangeQuery) -> Self {
        DateRange {
            start: query.start_date,
            end: query.end_date,
        }
    }
}

/// Resolve the tenant a request addresses, enforcing scoping. A college key
/// addressing another tenant reads as missing so keys cannot probe which
/// tenant ids exist.
pub(crate) async fn resolve_tenant(
    state: &AppState,
    principal: &AuthPrincipal,
    tenant_id: Uuid,
) -> Result<Tenant, AppError> {
    match principal {
        AuthPrincipal::Operator => state
            .tenant_repository
            .get_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", tenant_id))),
        AuthPrincipal::Tenant(tenant) => {
            if tenant.id != tenant_id {
                return Err(AppError::NotFound(format!("Tenant {} not found", tenant_id)));
            }
            Ok(tenant.clone())
        }
    }
}
