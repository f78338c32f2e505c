//! Content catalog endpoint handler.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::{ContentTypeSummary, ListTypesResponse, TaxonomySummary};
use crate::handlers::problem_details;
use crate::server::AppState;

/// GET /api/v1/types
///
/// Deletable content types with their usable taxonomies, for selection
/// UIs. Types without any taxonomy are not listed.
pub async fn list_types(State(state): State<AppState>) -> Response {
    let types = match state.services.content.list_types().await {
        Ok(types) => types,
        Err(e) => {
            error!(error = %e, "failed to list content types");
            return problem_details::internal_error("failed to list content types");
        }
    };

    let types = types
        .into_iter()
        .map(|t| ContentTypeSummary {
            id: t.id,
            label: t.label,
            taxonomies: t
                .taxonomies
                .into_iter()
                .map(|tax| TaxonomySummary {
                    id: tax.id,
                    label: tax.label,
                })
                .collect(),
        })
        .collect();

    Json(ListTypesResponse { types }).into_response()
}
