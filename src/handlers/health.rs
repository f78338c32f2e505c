use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::build_info;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

#[derive(Serialize)]
pub struct ReadyzResponse {
    pub status: String,
}

pub async fn readyz() -> Json<ReadyzResponse> {
    Json(ReadyzResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
}

pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: build_info::VERSION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_livez() {
        let (status, body) = livez().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_version_matches_crate() {
        let Json(body) = version().await;
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
