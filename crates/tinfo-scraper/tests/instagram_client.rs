//! Integration tests for `InstagramClient` against a mocked Apify API.
//!
//! Each test stands up a local `wiremock` server so no real network traffic
//! is made. The client is built with a short timeout, which also sets the
//! long-poll window to zero.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tinfo_core::Target;
use tinfo_scraper::{InstagramClient, ScraperError};

const ACTOR: &str = "actor1";

fn test_client(server: &MockServer, max_retries: u32) -> InstagramClient {
    InstagramClient::new("apify_api_test", ACTOR, 10, 5, max_retries, 0)
        .expect("failed to build test InstagramClient")
        .with_base_url(server.uri())
}

fn run_json(status: &str) -> serde_json::Value {
    json!({
        "data": {
            "id": "run1",
            "status": status,
            "defaultDatasetId": "ds1"
        }
    })
}

async fn mount_start(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/acts/{ACTOR}/runs")))
        .respond_with(ResponseTemplate::new(201).set_body_json(run_json("READY")))
        .mount(server)
        .await;
}

async fn mount_run_status(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/actor-runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json(status)))
        .mount(server)
        .await;
}

async fn mount_dataset(server: &MockServer, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/datasets/ds1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_target_posts_runs_actor_and_normalizes_items() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/acts/{ACTOR}/runs")))
        .and(header("authorization", "Bearer apify_api_test"))
        .and(body_partial_json(json!({
            "directUrls": ["https://www.instagram.com/explore/tags/torontojobs/"],
            "resultsType": "posts",
            "resultsLimit": 10
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(run_json("RUNNING")))
        .expect(1)
        .mount(&server)
        .await;
    mount_run_status(&server, "SUCCEEDED").await;
    mount_dataset(
        &server,
        json!([
            {
                "shortCode": "C1",
                "caption": "We are hiring servers downtown",
                "displayUrl": "https://cdn.example.com/1.jpg",
                "ownerUsername": "kinka_izakaya",
                "timestamp": "2026-03-01T12:00:00.000Z"
            },
            { "error": "no_items", "errorDescription": "Empty or private data" },
            { "shortCode": "C2", "caption": "bad ts", "timestamp": "not-a-date" },
            { "shortCode": "C3", "timestamp": "2026-02-28T08:00:00.000Z" }
        ]),
    )
    .await;

    let client = test_client(&server, 0);
    let posts = client
        .fetch_target_posts(&Target::hashtag("torontojobs"))
        .await
        .expect("fetch should succeed");

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].shortcode, "C1");
    assert_eq!(posts[0].author.as_deref(), Some("kinka_izakaya"));
    assert_eq!(posts[0].post_url, "https://www.instagram.com/p/C1/");
    assert_eq!(posts[1].shortcode, "C3");
    assert_eq!(posts[1].text, "");
}

#[tokio::test]
async fn wait_for_run_polls_until_succeeded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("RUNNING")))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_run_status(&server, "SUCCEEDED").await;

    let run = test_client(&server, 0)
        .wait_for_run("run1")
        .await
        .expect("run should finish");
    assert_eq!(run.status, "SUCCEEDED");
    assert_eq!(run.default_dataset_id, "ds1");
}

#[tokio::test]
async fn empty_dataset_yields_no_posts() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    mount_run_status(&server, "SUCCEEDED").await;
    mount_dataset(&server, json!([])).await;

    let posts = test_client(&server, 0)
        .fetch_target_posts(&Target::account("blogto"))
        .await
        .unwrap();
    assert!(posts.is_empty());
}

// ---------------------------------------------------------------------------
// Run failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_run_is_reported() {
    let server = MockServer::start().await;
    mount_start(&server).await;
    mount_run_status(&server, "FAILED").await;

    let err = test_client(&server, 0)
        .fetch_target_posts(&Target::hashtag("uklife"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::RunFailed { ref status, .. } if status == "FAILED"),
        "expected RunFailed, got: {err:?}"
    );
}

#[tokio::test]
async fn stuck_run_times_out_after_poll_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/actor-runs/run1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("RUNNING")))
        .expect(3)
        .mount(&server)
        .await;

    let err = test_client(&server, 0)
        .with_max_polls(3)
        .wait_for_run("run1")
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::RunTimedOut { polls: 3, .. }));
}

// ---------------------------------------------------------------------------
// HTTP errors and retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_run_retries_after_429_and_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/acts/{ACTOR}/runs")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_start(&server).await;

    let client = test_client(&server, 1);
    let input = client.actor_input(&Target::hashtag("torontojobs"));
    let run = client.start_run(&input).await.expect("retry should succeed");
    assert_eq!(run.id, "run1");
}

#[tokio::test]
async fn start_run_returns_rate_limited_after_exhausting_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/acts/{ACTOR}/runs")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let input = client.actor_input(&Target::hashtag("torontojobs"));
    let err = client.start_run(&input).await.unwrap_err();
    assert!(matches!(err, ScraperError::RateLimited { .. }));
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/acts/{ACTOR}/runs")))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let input = client.actor_input(&Target::hashtag("torontojobs"));
    let err = client.start_run(&input).await.unwrap_err();
    assert!(
        matches!(err, ScraperError::Api { status: 401, ref message, .. } if message == "invalid token"),
        "expected Api 401, got: {err:?}"
    );
}

#[tokio::test]
async fn server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds1/items"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_dataset(&server, json!([{ "shortCode": "C9" }])).await;

    let items = test_client(&server, 1)
        .dataset_items("ds1")
        .await
        .expect("retry should succeed");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].short_code.as_deref(), Some("C9"));
}

#[tokio::test]
async fn malformed_dataset_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server, 2)
        .dataset_items("ds1")
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::Deserialize { ref context, .. } if context == "dataset items")
    );
}
