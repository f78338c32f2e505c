//! Find endpoint handler.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{FindRequest, FindResponse, PostSummary};
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::sweep::{self, FindCriteria, SweepError};

use super::actor_from;

/// POST /api/v1/find
pub async fn find(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FindRequest>,
) -> Response {
    let actor = actor_from(&headers);
    let criteria = FindCriteria {
        content_type: req.content_type,
        taxonomy: req.taxonomy,
        term_filter: req.term_filter,
        delete_empty_terms: req.delete_empty_terms,
    };

    match sweep::find_items(&state.services, &actor, criteria, None).await {
        Ok(outcome) => {
            let posts: Vec<PostSummary> = outcome
                .items
                .iter()
                .map(|item| PostSummary {
                    id: item.id,
                    title: item.title.clone(),
                })
                .collect();
            let response = FindResponse {
                success: true,
                message: outcome.messages.join("\n"),
                count: posts.len(),
                posts,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(SweepError::InvalidSelection(message)) => {
            let response = FindResponse {
                success: false,
                message,
                posts: Vec::new(),
                count: 0,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "find failed");
            problem_details::internal_error("find failed")
        }
    }
}
