//! Application state shared across handlers.

use central_core::Config;
use central_db::{ApiKeyRepository, TenantRepository};
use central_services::{IngestService, RetrievalService};
use central_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

/// Main application state: pool, repositories, and the two services.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub tenant_repository: TenantRepository,
    pub api_key_repository: ApiKeyRepository,
    pub storage: Arc<dyn Storage>,
    pub ingest: IngestService,
    pub retrieval: RetrievalService,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
