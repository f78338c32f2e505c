use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::log::ActivityLog;
use crate::operation::OperationRegistry;
use crate::store::{ContentStore, TermStore};

// ============================================================================
// Runtime Services
// ============================================================================

/// Shared runtime services used by the handlers and the sweep workflow.
#[derive(Clone)]
pub struct RuntimeServices {
    pub content: Arc<dyn ContentStore>,
    pub terms: Arc<dyn TermStore>,
    pub logbook: ActivityLog,
    pub operations: OperationRegistry,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub services: RuntimeServices,
    pub api_token: Option<String>,
    pub admin_token: Option<String>,
    /// Retention period used by the manual log purge.
    pub retention_days: u32,
    pub max_connections: usize,
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    let max_connections = state.max_connections;

    let api_v1 = Router::new()
        .route("/types", get(handlers::v1::list_types))
        .route("/find", post(handlers::v1::find))
        .route("/delete-batch", post(handlers::v1::delete_batch))
        .route("/logs", get(handlers::v1::list_logs))
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024)) // 2 MB
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::api_auth::require_api_token,
        ))
        .layer(ConcurrencyLimitLayer::new(max_connections));

    let admin_routes = Router::new()
        .route("/logs/purge", post(handlers::v1::purge_logs))
        .with_state(state.clone())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::api_auth::require_admin_token,
        ));

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .nest("/api/v1", api_v1)
        .nest("/api/admin/v1", admin_routes)
}
