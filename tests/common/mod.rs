//! Common test utilities.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use serde_json::json;

use bulksweep::log::ActivityLog;
use bulksweep::operation::OperationRegistry;
use bulksweep::server::{self, AppState, RuntimeServices};
use bulksweep::store::file::{FileLogStore, FileSiteStore};

/// Seed site snapshot used across the integration tests.
///
/// - `article` items 101 and 102 are tagged "News Archive" (term 5),
///   item 104 is tagged "Archived" (term 9), item 103 is tagged "Fresh"
///   (term 12).
/// - `page` items 201 and 202 are also tagged term 9, so term 9 stays
///   non-empty after every article is deleted.
/// - Term counts are snapshot values and stale on purpose: term 12 records
///   a count of 0 even though item 103 is tagged with it.
pub fn seed_site() -> serde_json::Value {
    json!({
        "types": [
            {"id": "article", "label": "Articles", "taxonomies": ["category"]},
            {"id": "page", "label": "Pages", "taxonomies": ["category"]},
            {"id": "attachment", "label": "Attachments", "taxonomies": []}
        ],
        "taxonomies": [
            {"id": "category", "label": "Categories"},
            {"id": "tag", "label": "Tags"}
        ],
        "terms": [
            {"id": 5, "taxonomy": "category", "name": "News Archive", "slug": "news-archive", "count": 2},
            {"id": 9, "taxonomy": "category", "name": "Archived", "slug": "archived", "count": 3},
            {"id": 12, "taxonomy": "category", "name": "Fresh", "slug": "fresh", "count": 0}
        ],
        "items": [
            {"id": 101, "content_type": "article", "title": "Old report", "terms": [5]},
            {"id": 102, "content_type": "article", "title": "Older report", "terms": [5]},
            {"id": 103, "content_type": "article", "title": "Fresh piece", "terms": [12]},
            {"id": 104, "content_type": "article", "title": "Archived piece", "terms": [9]},
            {"id": 201, "content_type": "page", "title": "About", "terms": [9]},
            {"id": 202, "content_type": "page", "title": "Contact", "terms": [9]}
        ]
    })
}

/// Create a test `AppState` over a seeded site snapshot.
///
/// Returns the site store handle alongside the state so tests can inspect
/// storage after driving the API.
pub async fn test_state() -> (AppState, Arc<FileSiteStore>) {
    use tempfile::TempDir;

    // Leak the TempDir so it is not cleaned up mid-test.
    let tmp = Box::leak(Box::new(TempDir::new().unwrap()));

    let site_path = tmp.path().join("site.json");
    std::fs::write(&site_path, seed_site().to_string()).unwrap();

    let site = Arc::new(FileSiteStore::load(&site_path).await.unwrap());
    let logbook = ActivityLog::new(Arc::new(FileLogStore::new(tmp.path().join("logs"))));

    let state = AppState {
        services: RuntimeServices {
            content: site.clone(),
            terms: site.clone(),
            logbook,
            operations: OperationRegistry::new(Duration::from_secs(3600)),
        },
        api_token: None,
        admin_token: None,
        retention_days: 30,
        max_connections: 64,
    };
    (state, site)
}

/// Create a test app over a seeded site snapshot.
pub async fn test_app() -> Router {
    let (state, _) = test_state().await;
    server::build_app(state, 300)
}
