//! Integration tests for the HTTP API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;

use common::{test_app, test_state};

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// Health Endpoints
// ============================================================================

#[tokio::test]
async fn test_livez() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_readyz() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_version() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json.get("version").is_some());
}

// ============================================================================
// Catalog API
// ============================================================================

#[tokio::test]
async fn test_list_types_skips_types_without_taxonomies() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/api/v1/types").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let types = json["types"].as_array().unwrap();

    // "attachment" has no taxonomy and must not be offered.
    assert_eq!(types.len(), 2);
    assert_eq!(types[0]["id"], "article");
    assert_eq!(types[1]["id"], "page");
    assert_eq!(types[0]["taxonomies"][0]["label"], "Categories");
}

// ============================================================================
// Find API
// ============================================================================

#[tokio::test]
async fn test_find_rejects_unknown_content_type() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/find",
            json!({"content_type": "movie", "taxonomy": "category"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("movie"));
}

#[tokio::test]
async fn test_find_rejects_unknown_taxonomy() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/find",
            json!({"content_type": "article", "taxonomy": "genre"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_find_rejects_unassociated_taxonomy() {
    let app = test_app().await;

    // "tag" exists but is not registered for articles.
    let response = app
        .oneshot(post_json(
            "/api/v1/find",
            json!({"content_type": "article", "taxonomy": "tag"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("not registered"));
}

#[tokio::test]
async fn test_find_without_filter_matches_all_articles() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/find",
            json!({"content_type": "article", "taxonomy": "category"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 4);

    let ids: Vec<u64> = json["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![101, 102, 103, 104], "stable ascending order");
}

#[tokio::test]
async fn test_find_with_term_filter_narrows_to_matching_terms() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/find",
            json!({
                "content_type": "article",
                "taxonomy": "category",
                "term_filter": "archive"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 3);

    let ids: Vec<u64> = json["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![101, 102, 104]);

    // The message names both matched terms.
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("News Archive"));
    assert!(message.contains("archived"));
}

#[tokio::test]
async fn test_find_with_unmatched_filter_is_zero_result_success() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/find",
            json!({
                "content_type": "article",
                "taxonomy": "category",
                "term_filter": "zzz-no-such-term"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 0);
    assert_eq!(json["posts"], json!([]));
    assert!(json["message"].as_str().unwrap().contains("No terms found"));
}

#[tokio::test]
async fn test_find_always_writes_a_log_entry() {
    let app = test_app().await;

    app.clone()
        .oneshot(post_json(
            "/api/v1/find",
            json!({
                "content_type": "article",
                "taxonomy": "category",
                "term_filter": "zzz-no-such-term"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::get("/api/v1/logs?action=find")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "find");
    assert_eq!(entries[0]["acting_user"], "admin");
}

// ============================================================================
// DeleteBatch API
// ============================================================================

#[tokio::test]
async fn test_delete_batch_rejects_empty_ids() {
    let app = test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/v1/delete-batch",
            json!({"ids": [], "is_last_batch": false}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_delete_batch_counts_missing_item_as_error() {
    let (state, site) = test_state().await;
    let app = bulksweep::server::build_app(state, 300);

    app.clone()
        .oneshot(post_json(
            "/api/v1/find",
            json!({"content_type": "article", "taxonomy": "category"}),
        ))
        .await
        .unwrap();

    // Item 102 disappears between find and delete.
    use bulksweep::store::ContentStore;
    assert!(site.delete_item(102).await.unwrap());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/delete-batch",
            json!({"ids": [101, 102, 103], "is_last_batch": false}),
        ))
        .await
        .unwrap();

    // Failed-but-informative: HTTP 200, success false, full counts.
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["deleted_count"], 2);
    assert_eq!(json["error_count"], 1);
    assert!(json.get("final_operation_message").is_none());

    let details: Vec<&str> = json["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_str().unwrap())
        .collect();
    assert_eq!(
        details.iter().filter(|d| d.contains("Failed")).count(),
        1,
        "exactly one failure line"
    );
    assert!(details.iter().any(|d| d.contains("id 102")));

    // Not the last batch: no term cleanup ran.
    let response = app
        .oneshot(
            Request::get("/api/v1/logs?action=term_cleanup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["entries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_last_batch_runs_term_cleanup_and_clears_state() {
    let (state, site) = test_state().await;
    let app = bulksweep::server::build_app(state, 300);

    // Find "archive"-tagged articles with empty-term cleanup requested.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/find",
            json!({
                "content_type": "article",
                "taxonomy": "category",
                "term_filter": "archive",
                "delete_empty_terms": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 3);

    // Batch 1 of 2.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/delete-batch",
            json!({"ids": [101, 102], "is_last_batch": false}),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json.get("final_operation_message").is_none());

    // Batch 2 of 2: triggers the cleanup.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/delete-batch",
            json!({"ids": [104], "is_last_batch": true}),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["final_operation_message"].as_str().is_some());

    // Term 5 lost all items and was deleted; term 9 still has pages and
    // survives with a freshly recomputed count.
    use bulksweep::store::TermStore;
    assert!(site.get_term(5, "category").await.unwrap().is_none());
    let term9 = site.get_term(9, "category").await.unwrap().unwrap();
    assert_eq!(term9.count, 2);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/logs?action=term_cleanup&status=success")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["entries"].as_array().unwrap().len(), 1);

    // Operation state was consumed: a later "last batch" has nothing to
    // clean up and logs the skip instead.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/delete-batch",
            json!({"ids": [103], "is_last_batch": true}),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["success"], true);

    let response = app
        .oneshot(
            Request::get("/api/v1/logs?action=term_cleanup&status=info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0]["summary"].as_str().unwrap().contains("skipped"));
}

#[tokio::test]
async fn test_executor_degrades_gracefully_without_persisted_state() {
    let app = test_app().await;

    // No find ran for this actor; deletion still proceeds.
    let response = app
        .oneshot(post_json(
            "/api/v1/delete-batch",
            json!({"ids": [103], "is_last_batch": false}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["deleted_count"], 1);
}

#[tokio::test]
async fn test_operations_are_keyed_per_actor() {
    let (state, site) = test_state().await;
    let app = bulksweep::server::build_app(state, 300);

    // Alice finds the "archive" articles with cleanup on.
    let request = Request::post("/api/v1/find")
        .header("content-type", "application/json")
        .header("x-bulksweep-actor", "alice")
        .body(Body::from(
            json!({
                "content_type": "article",
                "taxonomy": "category",
                "term_filter": "archive",
                "delete_empty_terms": true
            })
            .to_string(),
        ))
        .unwrap();
    app.clone().oneshot(request).await.unwrap();

    // Bob's find must not disturb Alice's pending operation.
    let request = Request::post("/api/v1/find")
        .header("content-type", "application/json")
        .header("x-bulksweep-actor", "bob")
        .body(Body::from(
            json!({
                "content_type": "article",
                "taxonomy": "category",
                "term_filter": "fresh"
            })
            .to_string(),
        ))
        .unwrap();
    app.clone().oneshot(request).await.unwrap();

    // Alice completes her operation; her settings still drive the cleanup.
    for (ids, last) in [(json!([101, 102]), false), (json!([104]), true)] {
        let request = Request::post("/api/v1/delete-batch")
            .header("content-type", "application/json")
            .header("x-bulksweep-actor", "alice")
            .body(Body::from(json!({"ids": ids, "is_last_batch": last}).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await["success"], true);
    }

    use bulksweep::store::TermStore;
    assert!(site.get_term(5, "category").await.unwrap().is_none());
}

// ============================================================================
// Logs API
// ============================================================================

#[tokio::test]
async fn test_list_logs_rejects_unknown_action() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::get("/api/v1/logs?action=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/problem+json"
    );

    let json = body_json(response).await;
    // RFC 7807 required fields
    assert!(json.get("type").is_some());
    assert!(json.get("title").is_some());
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_manual_purge_runs_and_logs() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/admin/v1/logs/purge")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["removed"], 0);

    let response = app
        .oneshot(
            Request::get("/api/v1/logs?action=cron_cleanup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["acting_user"], "manual");
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_api_token_required_when_configured() {
    let (mut state, _) = test_state().await;
    state.api_token = Some("sesame".to_string());
    let app = bulksweep::server::build_app(state, 300);

    let response = app
        .clone()
        .oneshot(Request::get("/api/v1/types").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::get("/api/v1/types")
                .header("authorization", "Bearer sesame")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoints_stay_open() {
    let (mut state, _) = test_state().await;
    state.api_token = Some("sesame".to_string());
    let app = bulksweep::server::build_app(state, 300);

    let response = app
        .oneshot(Request::get("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
