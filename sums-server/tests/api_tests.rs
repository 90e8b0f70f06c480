//! Integration tests for sums-server HTTP endpoints
//!
//! Tests cover:
//! - Greeting pages on `/` and `/v1`
//! - `/v1/math` listing
//! - Create and fetch on `/v1/math/sums`
//! - Validation, content negotiation, 404 and 405 mapping
//! - Request body limit
//! - Health endpoint

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use sums_server::{build_router, AppState};
use tower::util::ServiceExt; // for `oneshot` method

const TEST_BODY_LIMIT: usize = 1024 * 1024;

/// Test helper: app with a fresh cache
fn setup_app() -> axum::Router {
    let state = AppState::new().expect("Should build pipeline");
    build_router(state, TEST_BODY_LIMIT)
}

/// Test helper: request without content-type
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: JSON POST
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

/// Test helper: Extract JSON body from response
async fn extract_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}

async fn error_code(response: Response) -> String {
    let body = extract_json(response).await;
    body["error"]["code"].as_str().expect("Should carry error code").to_string()
}

// =============================================================================
// Greeting and listing
// =============================================================================

#[tokio::test]
async fn test_root_greeting_is_html() {
    let app = setup_app();

    for uri in ["/", "/v1", "/v1/"] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"), "{}", uri);
        assert_eq!(body_bytes(response).await, b"<h1>Hello World</h1>");
    }
}

#[tokio::test]
async fn test_greeting_ignores_negotiated_json() {
    let app = setup_app();
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test]
async fn test_post_root_is_not_found() {
    let response = setup_app().oneshot(test_request("POST", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_math_listing_any_method() {
    let app = setup_app();

    for method in ["GET", "POST", "DELETE"] {
        let response = app.clone().oneshot(test_request(method, "/v1/math")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", method);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(extract_json(response).await, json!({ "routes": ["/v1/math/sums"] }));
    }
}

// =============================================================================
// Sums
// =============================================================================

#[tokio::test]
async fn test_create_then_fetch() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/v1/math/sums", json!({ "set": [3, 1, 2] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = extract_json(response).await;
    assert_eq!(created["set"], json!([1, 2, 3]));
    assert_eq!(created["sum"], 6);
    let id = created["id"].as_str().expect("Should have id").to_string();

    let response = app
        .oneshot(test_request("GET", &format!("/v1/math/sums/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response).await, created);
}

#[tokio::test]
async fn test_create_without_content_type_defaults_to_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/math/sums")
        .body(Body::from(r#"{"set":[5]}"#))
        .unwrap();

    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(extract_json(response).await["sum"], 5);
}

#[tokio::test]
async fn test_equal_content_shares_one_id() {
    let app = setup_app();

    let first = extract_json(
        app.clone()
            .oneshot(json_request("POST", "/v1/math/sums", json!({ "set": [3, 1, 2] })))
            .await
            .unwrap(),
    )
    .await;
    let second = extract_json(
        app.oneshot(json_request("POST", "/v1/math/sums", json!({ "set": [2, 3, 1] })))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_empty_set_sums_to_zero() {
    let response = setup_app()
        .oneshot(json_request("POST", "/v1/math/sums", json!({ "set": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["set"], json!([]));
    assert_eq!(body["sum"], 0);
}

#[tokio::test]
async fn test_invalid_sets_are_bad_request() {
    let app = setup_app();

    for body in [
        json!({ "set": "not-an-array" }),
        json!({ "set": [1, "a", 3] }),
        json!({ "set": [1.5] }),
        json!({ "set": null }),
        json!({ "values": [1] }),
        json!({ "set": [i64::MAX, 1] }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/v1/math/sums", body.clone()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(error_code(response).await, "BAD_REQUEST", "{}", body);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/math/sums")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"set\": [1,"))
        .unwrap();

    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = setup_app();

    for id in ["unknown-id", "00000000-0000-4000-8000-000000000000"] {
        let response = app
            .clone()
            .oneshot(test_request("GET", &format!("/v1/math/sums/{}", id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", id);
        assert_eq!(error_code(response).await, "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_fetch_rejects_other_spellings_of_issued_id() {
    let app = setup_app();

    let created = extract_json(
        app.clone()
            .oneshot(json_request("POST", "/v1/math/sums", json!({ "set": [3, 1, 2] })))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().expect("Should have id").to_string();

    for spelling in [id.to_uppercase(), id.replace('-', ""), format!("urn:uuid:{}", id)] {
        let response = app
            .clone()
            .oneshot(test_request("GET", &format!("/v1/math/sums/{}", spelling)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", spelling);
    }
}

#[tokio::test]
async fn test_head_is_answered_like_get() {
    let app = setup_app();

    let created = extract_json(
        app.clone()
            .oneshot(json_request("POST", "/v1/math/sums", json!({ "set": [1] })))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().expect("Should have id").to_string();

    for uri in ["/".to_string(), "/v1".to_string(), format!("/v1/math/sums/{}", id), "/health".to_string()] {
        let response = app.clone().oneshot(test_request("HEAD", &uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let app = setup_app();

    for (method, uri) in [
        ("PUT", "/v1/math/sums"),
        ("GET", "/v1/math/sums"),
        ("DELETE", "/v1/math/sums/some-id"),
        ("POST", "/v1/math/sums/some-id"),
    ] {
        let response = app.clone().oneshot(test_request(method, uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
        assert_eq!(error_code(response).await, "METHOD_NOT_ALLOWED");
    }
}

// =============================================================================
// Negotiation and fallbacks
// =============================================================================

#[tokio::test]
async fn test_unsupported_content_type_is_rejected_before_routing() {
    let state = AppState::new().unwrap();
    let app = build_router(state.clone(), TEST_BODY_LIMIT);
    let request = Request::builder()
        .method("POST")
        .uri("/v1/math/sums")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"set":[1]}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(body["error"]["message"].as_str().unwrap().contains("text/plain"));

    // The create stage never ran
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn test_json_content_type_with_charset_accepted() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/math/sums")
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"set":[1,2]}"#))
        .unwrap();

    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = setup_app()
        .oneshot(test_request("GET", "/does/not/exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"].as_str().unwrap().contains("/does/not/exist"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let state = AppState::new().unwrap();
    let app = build_router(state.clone(), 16);

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/math/sums",
            json!({ "set": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(state.cache.is_empty());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = setup_app().oneshot(test_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "sums-server");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
