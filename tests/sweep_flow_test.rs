//! End-to-end test: the CLI client and batch scheduler driving a real
//! server over HTTP, exactly as `bulksweep sweep` does.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bulksweep::api::FindRequest;
use bulksweep::client::{BatchScheduler, SchedulerError, StartGate, SweepClient};
use bulksweep::server;
use bulksweep::store::file::FileSiteStore;
use bulksweep::store::{ContentStore, ItemQuery, TermStore};

mod common;

use common::test_state;

/// Serve the app on an ephemeral port, returning its base URL.
async fn spawn_server() -> (String, Arc<FileSiteStore>) {
    let (state, site) = test_state().await;
    let app = server::build_app(state, 300);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{addr}"), site)
}

#[tokio::test]
async fn full_sweep_deletes_items_and_cleans_terms() {
    let (base_url, site) = spawn_server().await;
    let client = SweepClient::new(&base_url, None, "admin");

    client.health().await.unwrap();

    let found = client
        .find(&FindRequest {
            content_type: "article".to_string(),
            taxonomy: "category".to_string(),
            term_filter: "archive".to_string(),
            delete_empty_terms: true,
        })
        .await
        .unwrap();
    assert!(found.success);
    assert_eq!(found.count, 3);

    let ids: Vec<u64> = found.posts.iter().map(|p| p.id).collect();
    let batches: Arc<Mutex<Vec<usize>>> = Default::default();
    let seen = batches.clone();

    let scheduler = BatchScheduler::new(client.clone(), 2, Duration::ZERO)
        .on_post_batch(move |ids, _| seen.lock().unwrap().push(ids.len()));
    let outcome = scheduler
        .run(
            ids,
            StartGate {
                dry_run: false,
                confirmed: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.deleted, 3);
    assert_eq!(outcome.errors, 0);
    assert_eq!(*batches.lock().unwrap(), vec![2, 1]);

    // Server-side effects: the articles are gone, the emptied term was
    // removed, the still-used term survives.
    let query = ItemQuery {
        content_type: "article".to_string(),
        taxonomy: "category".to_string(),
        term_ids: None,
    };
    assert_eq!(site.find_ids(&query).await.unwrap(), vec![103]);
    assert!(site.get_term(5, "category").await.unwrap().is_none());
    assert!(site.get_term(9, "category").await.unwrap().is_some());

    // Every step left a trail in the activity log.
    let finds = client.list_logs(Some("find"), None, None).await.unwrap();
    assert_eq!(finds.len(), 1);
    let batches_logged = client
        .list_logs(Some("delete_batch"), None, None)
        .await
        .unwrap();
    assert_eq!(batches_logged.len(), 2);
    let cleanups = client
        .list_logs(Some("term_cleanup"), Some("success"), None)
        .await
        .unwrap();
    assert_eq!(cleanups.len(), 1);
}

#[tokio::test]
async fn dry_run_never_dispatches_a_deletion() {
    let (base_url, site) = spawn_server().await;
    let client = SweepClient::new(&base_url, None, "admin");

    let found = client
        .find(&FindRequest {
            content_type: "article".to_string(),
            taxonomy: "category".to_string(),
            term_filter: String::new(),
            delete_empty_terms: false,
        })
        .await
        .unwrap();
    assert_eq!(found.count, 4);

    let ids: Vec<u64> = found.posts.iter().map(|p| p.id).collect();
    let scheduler = BatchScheduler::new(client, 2, Duration::ZERO);
    let err = scheduler
        .run(
            ids,
            StartGate {
                dry_run: true,
                confirmed: true,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, SchedulerError::DryRunActive);

    let query = ItemQuery {
        content_type: "article".to_string(),
        taxonomy: "category".to_string(),
        term_ids: None,
    };
    assert_eq!(site.find_ids(&query).await.unwrap().len(), 4, "nothing deleted");
}

#[tokio::test]
async fn validation_failure_surfaces_in_the_find_envelope() {
    let (base_url, _site) = spawn_server().await;
    let client = SweepClient::new(&base_url, None, "admin");

    let found = client
        .find(&FindRequest {
            content_type: "movie".to_string(),
            taxonomy: "category".to_string(),
            term_filter: String::new(),
            delete_empty_terms: false,
        })
        .await
        .unwrap();

    assert!(!found.success);
    assert!(found.message.contains("movie"));
    assert_eq!(found.count, 0);
}
