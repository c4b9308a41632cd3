//! Route configuration and setup.
//!
//! Backup route groups live here; health checks in [health](health).

mod health;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use central_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

const API_PREFIX: &str = "/api/v0";

// Headroom for multipart framing on top of the raw file size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = setup_auth_state(config, &state)?;

    let public_routes = public_routes(state.clone());
    let protected_routes =
        backup_routes(state.clone()).layer(axum::middleware::from_fn_with_state(
            Arc::new(auth_state),
            auth_middleware,
        ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1024)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = public_routes
        .merge(protected_routes)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_backup_size_bytes + MULTIPART_OVERHEAD,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn setup_auth_state(config: &Config, state: &Arc<AppState>) -> Result<AuthState, anyhow::Error> {
    if let Some(ref master) = config.master_api_key {
        if master.len() < 32 {
            return Err(anyhow::anyhow!(
                "MASTER_API_KEY must be at least 32 characters long"
            ));
        }
    } else {
        tracing::warn!("MASTER_API_KEY not set; operator endpoints are unavailable");
    }

    Ok(AuthState {
        master_api_key: config.master_api_key.clone(),
        api_key_repository: state.api_key_repository.clone(),
        tenant_repository: state.tenant_repository.clone(),
    })
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/health",
            get({
                let state = state.clone();
                move || {
                    let state = state.clone();
                    async { health::health_check(state).await }
                }
            }),
        )
        .route(
            "/health/live",
            get({
                let state = state.clone();
                move || async { health::liveness_check(state).await }
            }),
        )
        .route(
            "/health/ready",
            get({
                let state = state.clone();
                move || async { health::readiness_check(state).await }
            }),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .with_state(state)
}

fn backup_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/backups", API_PREFIX),
            post(handlers::backup_upload::upload_backup),
        )
        .route(
            &format!("{}/backups/{{id}}/file", API_PREFIX),
            get(handlers::backup_download::download_backup),
        )
        .route(
            &format!("{}/backups/{{id}}", API_PREFIX),
            delete(handlers::backup_delete::delete_backup),
        )
        .route(
            &format!("{}/tenants/{{id}}/backups", API_PREFIX),
            get(handlers::backup_list::list_backups),
        )
        .route(
            &format!("{}/tenants/{{id}}/backups/archive", API_PREFIX),
            get(handlers::backup_bundle::bundle_backups),
        )
        .route(
            &format!("{}/tenants", API_PREFIX),
            post(handlers::admin::create_tenant).get(handlers::admin::list_tenants),
        )
        .route(
            &format!("{}/tenants/{{id}}/api-keys", API_PREFIX),
            post(handlers::admin::create_api_key),
        )
        .route(
            &format!("{}/api-keys/{{id}}", API_PREFIX),
            delete(handlers::admin::revoke_api_key),
        )
        .with_state(state)
}
