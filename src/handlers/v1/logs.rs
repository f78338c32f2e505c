//! Activity log endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::error;

use crate::api::{LogEntryResponse, ListLogsResponse, PurgeLogsResponse};
use crate::handlers::problem_details;
use crate::log::LogQuery;
use crate::retention;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct ListLogsParams {
    action: Option<String>,
    status: Option<String>,
    limit: Option<usize>,
}

/// GET /api/v1/logs
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<ListLogsParams>,
) -> Response {
    let mut query = LogQuery {
        limit: params.limit,
        ..Default::default()
    };
    if let Some(action) = &params.action {
        match action.parse() {
            Ok(action) => query.action = Some(action),
            Err(e) => return problem_details::bad_request(e),
        }
    }
    if let Some(status) = &params.status {
        match status.parse() {
            Ok(status) => query.status = Some(status),
            Err(e) => return problem_details::bad_request(e),
        }
    }

    let entries = match state.services.logbook.query(&query).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "failed to query activity log");
            return problem_details::internal_error("failed to query activity log");
        }
    };

    let entries = entries
        .into_iter()
        .map(|e| LogEntryResponse {
            id: e.id,
            timestamp: e.timestamp.to_rfc3339(),
            action: e.action.to_string(),
            status: e.status.to_string(),
            acting_user: e.acting_user,
            summary: e.summary,
            found: e.found,
            attempted: e.attempted,
            deleted: e.deleted,
            errors: e.errors,
            details: e.details,
        })
        .collect();

    Json(ListLogsResponse { entries }).into_response()
}

/// POST /api/admin/v1/logs/purge
///
/// Runs the retention sweep on demand, using the configured retention
/// period.
pub async fn purge_logs(State(state): State<AppState>) -> Response {
    match retention::run_sweep(&state.services.logbook, state.retention_days, "manual").await {
        Some(removed) => Json(PurgeLogsResponse { removed }).into_response(),
        None => problem_details::internal_error("log purge failed"),
    }
}
