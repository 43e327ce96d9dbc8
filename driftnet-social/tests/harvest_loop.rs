mod common;

use std::time::{Duration, Instant};

use driftnet_config::{SearchConfig, SearchSettings};
use driftnet_social::twitter::Harvester;
use serde_json::json;
use wiremock::matchers::{header, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> SearchSettings {
    SearchSettings {
        endpoint: server.uri(),
        query_type: "Latest".to_string(),
        api_key: "test-key".to_string(),
        max_duration: Duration::from_secs(5),
    }
}

fn harvester_for(server: &MockServer) -> Harvester {
    Harvester::new(&settings_for(server))
        .expect("harvester")
        .with_page_delay(Duration::ZERO)
        .with_backoff_delay(Duration::ZERO)
}

fn page(tweets: serde_json::Value, next_cursor: Option<&str>) -> serde_json::Value {
    match next_cursor {
        Some(cursor) => json!({
            "tweets": tweets,
            "has_next_page": true,
            "next_cursor": cursor,
        }),
        None => json!({
            "tweets": tweets,
            "has_next_page": false,
        }),
    }
}

#[tokio::test]
async fn single_page_is_normalized_and_returned() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("x-api-key", "test-key"))
        .and(query_param("queryType", "Latest"))
        .and(query_param("cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": "1", "text": "first", "likeCount": 3 },
                { "id": "2", "text": "second" }
            ]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let posts = harvester_for(&server).harvest("rustlang").await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].metrics.id, "1");
    assert_eq!(posts[0].metrics.like_count, 3);
    assert_eq!(posts[1].text, "second");
    assert_eq!(posts[1].source, "twitter");
}

#[tokio::test]
async fn follows_cursor_across_pages() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": "1", "text": "page one" }]),
            Some("c2"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": "2", "text": "page two" }]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let posts = harvester_for(&server).harvest("rustlang").await;

    let ids: Vec<&str> = posts.iter().map(|p| p.metrics.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn rate_limit_retries_the_same_cursor_once_backed_off() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    // First hit is rate-limited; the mock expires after one use so the
    // retry falls through to the success mock below.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": "1", "text": "after backoff" }]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let posts = harvester_for(&server).harvest("rustlang").await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "after backoff");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2, "exactly one retry for the cursor");
}

#[tokio::test]
async fn server_error_on_second_page_yields_first_page_only() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                { "id": "1", "text": "kept" },
                { "id": "2", "text": "also kept" }
            ]),
            Some("c2"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let posts = harvester_for(&server).harvest("rustlang").await;

    // Partial-result policy: page one survives, nothing is thrown.
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].metrics.id, "1");
    assert_eq!(posts[1].metrics.id, "2");
}

#[tokio::test]
async fn malformed_body_yields_partial_results() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("cursor", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": "1", "text": "kept" }]),
            Some("c2"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let posts = harvester_for(&server).harvest("rustlang").await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].metrics.id, "1");
}

#[tokio::test]
async fn budget_stops_a_provider_that_never_runs_out_of_pages() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    // Always another page: only the budget can end this loop.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{ "id": "1", "text": "again" }]),
            Some("forever"),
        )))
        .mount(&server)
        .await;

    let settings = SearchSettings {
        max_duration: Duration::from_millis(150),
        ..settings_for(&server)
    };
    let harvester = Harvester::new(&settings)
        .expect("harvester")
        .with_page_delay(Duration::from_millis(10))
        .with_backoff_delay(Duration::ZERO);

    let started = Instant::now();
    let posts = harvester.harvest("rustlang").await;

    assert!(!posts.is_empty());
    // Budget plus one in-flight request, with generous slack for CI.
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    let config = SearchConfig {
        endpoint: server.uri(),
        query_type: "Latest".to_string(),
        api_key: "".to_string(),
        max_duration_secs: "60".to_string(),
    };

    assert!(config.validate().is_err());

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty(), "no network activity before validation");
}

#[tokio::test]
async fn surrounding_quotes_are_stripped_from_the_keyword() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query", "bitcoin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page(json!([{ "id": "1", "text": "btc" }]), None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let posts = harvester_for(&server).harvest("\"bitcoin\"").await;

    // An unsanitized keyword would miss the matcher, 404, and come back empty.
    assert_eq!(posts.len(), 1);
}
