//! Bearer token authentication for API and admin routes.
//!
//! Behavior:
//! - Token configured: requires `Authorization: Bearer <token>` header
//! - Token not configured: only accepts requests from loopback addresses
//!   (in-process requests carry no socket address and count as local)

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};

use crate::server::AppState;

/// Check a request against an optional token.
///
/// Token comparison goes through SHA-256 digests so it is constant-time
/// with respect to the provided value.
pub fn is_authorized(
    token: &Option<String>,
    addr: Option<&SocketAddr>,
    headers: &HeaderMap,
) -> bool {
    match token {
        Some(expected) => headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|provided| {
                let a = Sha256::digest(provided.as_bytes());
                let b = Sha256::digest(expected.as_bytes());
                a == b
            }),
        None => addr.map(|a| a.ip().is_loopback()).unwrap_or(true),
    }
}

/// Peer address recorded by `into_make_service_with_connect_info`, if any.
fn peer_addr(request: &Request<axum::body::Body>) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Middleware guarding `/api/v1/*` with `api_token` from `AppState`.
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let addr = peer_addr(&request);
    if is_authorized(&state.api_token, addr.as_ref(), request.headers()) {
        next.run(request).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

/// Middleware guarding `/api/admin/v1/*` with `admin_token` from `AppState`.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let addr = peer_addr(&request);
    if is_authorized(&state.admin_token, addr.as_ref(), request.headers()) {
        next.run(request).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}
