use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonapi_view::api::handlers::ViewState;
use jsonapi_view::api::routes::create_router;
use jsonapi_view::model::{PresentationOptions, JSON_API_MEDIA_TYPE};
use jsonapi_view::seed;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// Test client wrapper for making in-process API calls
struct TestClient {
    app: Router,
}

struct TestResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

impl TestClient {
    fn new() -> Self {
        Self::with_options(PresentationOptions {
            debug_pretty_print: false,
            ..PresentationOptions::default()
        })
    }

    fn with_options(options: PresentationOptions) -> Self {
        let store = Arc::new(seed::seeded_store().unwrap());
        let state = Arc::new(ViewState::new(store, options));
        Self {
            app: create_router().with_state(state),
        }
    }

    async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|s| s.to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            content_type,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

#[tokio::test]
async fn test_health_check() {
    let client = TestClient::new();
    let response = client.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "healthy");
}

#[tokio::test]
async fn test_view_country() {
    let client = TestClient::new();
    let response = client.get("/countries/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some(JSON_API_MEDIA_TYPE));
    assert!(response.body.contains(r#""self":"\/countries\/1""#));

    let document = response.json();
    assert_eq!(document["data"]["attributes"]["dummy-counter"], 11111);
    assert_eq!(
        document["data"]["relationships"]["national-capital"]["links"]["self"],
        "/national_capitals/view/1"
    );
}

#[tokio::test]
async fn test_action_route_for_national_capitals() {
    let client = TestClient::new();
    let response = client.get("/national_capitals/view/2").await;

    assert_eq!(response.status, StatusCode::OK);
    let document = response.json();
    assert_eq!(document["data"]["type"], "national-capitals");
    assert_eq!(document["data"]["attributes"]["name"], "Brussels");
    assert_eq!(document["data"]["links"]["self"], "/national_capitals/view/2");
}

#[tokio::test]
async fn test_include_and_sparse_fieldsets() {
    let client = TestClient::new();
    let response = client
        .get("/countries/2?include=currency,cultures&fields%5Bcountries%5D=name,cultures&fields%5Bcultures%5D=code")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let document = response.json();
    assert_eq!(document["data"]["attributes"], json!({"name": "Belgium"}));

    let relationships = document["data"]["relationships"].as_object().unwrap();
    assert_eq!(relationships.keys().collect::<Vec<_>>(), vec!["cultures"]);

    let included = document["included"].as_array().unwrap();
    assert_eq!(included.len(), 3);
    assert_eq!(included[0]["type"], "currencies");
    assert_eq!(included[2]["attributes"], json!({"code": "fr-BE"}));
}

#[tokio::test]
async fn test_paginated_collection() {
    let client = TestClient::new();
    let response = client.get("/countries?page=2&limit=1").await;

    assert_eq!(response.status, StatusCode::OK);
    let document = response.json();
    assert_eq!(document["data"].as_array().unwrap().len(), 1);
    assert_eq!(document["data"][0]["id"], "2");
    assert_eq!(
        document["links"],
        json!({
            "self": "/countries?page=2&limit=1",
            "first": "/countries?page=1&limit=1",
            "last": "/countries?page=2&limit=1",
            "prev": "/countries?page=1&limit=1"
        })
    );
    assert_eq!(
        document["meta"],
        json!({"record_count": 2, "page_count": 2, "page_limit": 1})
    );
}

#[tokio::test]
async fn test_unpaginated_collection_has_no_links() {
    let client = TestClient::new();
    let document = client.get("/currencies").await.json();

    assert_eq!(document["data"].as_array().unwrap().len(), 2);
    assert!(document.get("links").is_none());
    assert!(document.get("meta").is_none());
}

#[tokio::test]
async fn test_url_prefix_from_options() {
    let client = TestClient::with_options(PresentationOptions {
        url_prefix: Some("/api".to_string()),
        debug_pretty_print: false,
        ..PresentationOptions::default()
    });
    let document = client.get("/currencies/1").await.json();

    assert_eq!(document["data"]["links"]["self"], "/api/currencies/1");
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let client = TestClient::new();
    let response = client.get("/countries/99").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.content_type.as_deref(), Some(JSON_API_MEDIA_TYPE));
    assert_eq!(response.json()["errors"][0]["status"], "404");
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let client = TestClient::new();
    let response = client.get("/planets").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_include_is_a_bad_request() {
    let client = TestClient::new();
    let response = client.get("/countries/1?include=planets").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let error = &response.json()["errors"][0];
    assert_eq!(error["code"], "invalid_option");
    assert!(error["detail"].as_str().unwrap().contains("planets"));
}

#[tokio::test]
async fn test_bad_page_is_a_bad_request() {
    let client = TestClient::new();
    let response = client.get("/countries?page=first").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_limit_is_a_single_page() {
    let client = TestClient::new();
    let response = client
        .get("/countries?page=3&limit=18446744073709551615")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let document = response.json();
    assert_eq!(document["meta"]["page_count"], 1);
    assert_eq!(document["meta"]["record_count"], 2);
    assert_eq!(document["meta"]["page_limit"], u64::MAX);
}
