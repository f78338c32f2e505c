//! DeleteBatch endpoint handler.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{DeleteBatchRequest, DeleteBatchResponse};
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::sweep::{self, SweepError};

use super::actor_from;

/// POST /api/v1/delete-batch
///
/// Per-item errors do not fail the HTTP call: the response keeps status
/// 200 with `success: false` and full counts, so callers can keep accurate
/// totals across batches.
pub async fn delete_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DeleteBatchRequest>,
) -> Response {
    let actor = actor_from(&headers);

    match sweep::process_batch(&state.services, &actor, &req.ids, req.is_last_batch).await {
        Ok(outcome) => {
            let response = DeleteBatchResponse {
                success: outcome.errors == 0,
                message: format!(
                    "Processed {} items in batch: {} deleted, {} errors.",
                    outcome.attempted, outcome.deleted, outcome.errors
                ),
                deleted_count: outcome.deleted,
                error_count: outcome.errors,
                details: outcome.details,
                final_operation_message: outcome.final_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(SweepError::EmptyBatch) => {
            let response = DeleteBatchResponse {
                success: false,
                message: "No item IDs provided for this batch.".to_string(),
                deleted_count: 0,
                error_count: 0,
                details: Vec::new(),
                final_operation_message: None,
            };
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "delete batch failed");
            problem_details::internal_error("delete batch failed")
        }
    }
}
