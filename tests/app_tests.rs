//! Integration tests for the application context.
//!
//! These tests verify that only the latest search is shown and that forms
//! cannot be submitted twice concurrently.

use std::sync::Arc;
use std::time::Duration;

use clothing_comparator::app::{AppContext, SearchOutcome};
use clothing_comparator::auth::{MemorySessionStore, Profile, Session, SessionStore};
use clothing_comparator::search::{SearchQuery, SortOrder};
use clothing_comparator::{ApiBaseUrl, ClientConfig, ClientError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an application context pointing at the mock server.
fn create_app(server: &MockServer) -> (AppContext, Arc<MemorySessionStore>) {
    let config = ClientConfig::builder()
        .base_url(ApiBaseUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    let store = Arc::new(MemorySessionStore::new());
    (AppContext::new(config, store.clone()), store)
}

fn results_named(name: &str, prices: &[u32]) -> serde_json::Value {
    let results: Vec<_> = prices
        .iter()
        .map(|p| json!({"name": format!("{name}-{p}"), "price": p, "site": "Meesho"}))
        .collect();
    json!({ "results": results, "errors": null })
}

#[tokio::test]
async fn test_last_submitted_query_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(results_named("slow", &[1, 2, 3]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_named("fast", &[9])))
        .mount(&server)
        .await;

    let (app, _) = create_app(&server);

    let (slow, fast) = tokio::join!(app.submit_search(SearchQuery::text("slow")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.submit_search(SearchQuery::text("fast")).await
    });

    assert!(matches!(slow, SearchOutcome::Superseded));
    match fast {
        SearchOutcome::Applied(snapshot) => assert_eq!(snapshot.results.len(), 1),
        other => panic!("expected Applied, got {other:?}"),
    }

    let snapshot = app.results().snapshot();
    assert_eq!(snapshot.query.unwrap().text, "fast");
    assert_eq!(snapshot.results[0].name, "fast-9");
}

#[tokio::test]
async fn test_failed_search_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (app, _) = create_app(&server);
    let outcome = app.submit_search(SearchQuery::text("kurta")).await;

    assert!(matches!(outcome, SearchOutcome::Failed(ClientError::Response(_))));
    assert_eq!(
        app.results().snapshot().error.as_deref(),
        Some("Request failed with status 502")
    );
}

#[tokio::test]
async fn test_blank_search_leaves_results_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_named("kurta", &[5, 1])))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = create_app(&server);
    app.submit_search(SearchQuery::text("kurta")).await;

    let outcome = app.submit_search(SearchQuery::text("")).await;
    assert!(matches!(outcome, SearchOutcome::Failed(ClientError::Validation(_))));
    assert_eq!(app.results().results().len(), 2);
}

#[tokio::test]
async fn test_sort_applies_to_shown_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(results_named("item", &[700, 100, 400])),
        )
        .mount(&server)
        .await;

    let (app, _) = create_app(&server);
    app.submit_search(SearchQuery::text("shirt")).await;
    app.results().sort(SortOrder::PriceAscending);

    let prices: Vec<_> = app.results().results().iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![Some(100.0), Some(400.0), Some(700.0)]);
}

#[tokio::test]
async fn test_concurrent_login_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access": "a", "refresh": "r",
                    "user": {"username": "asha", "email": "asha@example.com"}
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (app, store) = create_app(&server);

    let (first, second) = tokio::join!(app.submit_login("asha@example.com", "Secret123"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        app.submit_login("asha@example.com", "Secret123").await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(ClientError::InProgress)));
    assert!(store.current().is_some());

    // Released once the first login completes.
    assert!(app
        .submit_login("asha@example.com", "Secret123")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_logout_clears_session_and_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_named("item", &[1])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search/save"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let (app, store) = create_app(&server);
    store
        .save(&Session::new(
            "access".to_string(),
            "refresh".to_string(),
            Profile::default(),
        ))
        .unwrap();

    app.submit_search(SearchQuery::text("shirt")).await;
    assert_eq!(app.results().results().len(), 1);

    app.logout();

    assert!(store.current().is_none());
    assert!(app.results().results().is_empty());
}
