//! Versioned API handlers.

mod batch;
mod find;
mod logs;
mod types;

pub use batch::delete_batch;
pub use find::find;
pub use logs::{list_logs, purge_logs};
pub use types::list_types;

use axum::http::HeaderMap;

use crate::api::{ACTOR_HEADER, DEFAULT_ACTOR};

/// Operator identity for the request, from the actor header.
pub(crate) fn actor_from(headers: &HeaderMap) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_ACTOR)
        .to_string()
}
