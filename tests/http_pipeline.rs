mod common;

use axum::http::{Method, StatusCode};
use common::{ORIGIN, TestApp, authorized};
use serde_json::{Value, json};

// ─── CLIENT KEY ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_client_key() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/url/guest")
        .json(&json!({ "originalUrl": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "authorization api key required");
    assert!(app.links.is_empty());
}

#[tokio::test]
async fn test_malformed_client_key() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/url/redirect")
        .add_header("authorization", "Basic dXNlcjpwYXNz")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "malformed client authorization header");
}

#[tokio::test]
async fn test_wrong_client_key() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/url/redirect")
        .add_header("authorization", "Bearer not-the-key")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "invalid client authorization token");
}

// ─── CORS ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_preflight_is_answered_before_client_key() {
    let app = TestApp::new();

    let response = app.server.method(Method::OPTIONS, "/url/create_url").await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), ORIGIN);
    assert_eq!(response.header("access-control-allow-credentials"), "true");
    assert!(
        response
            .header("access-control-allow-methods")
            .to_str()
            .unwrap()
            .contains("DELETE")
    );
}

#[tokio::test]
async fn test_cors_headers_on_errors() {
    let app = TestApp::new();

    let response = app.server.get("/url/redirect").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("access-control-allow-origin"), ORIGIN);
}

// ─── RATE GATE ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_strict_route_allows_burst_then_rejects() {
    let app = TestApp::new();

    for expected_remaining in (0..5).rev() {
        let response = authorized(app.server.post("/url/check_alias"))
            .json(&json!({ "alias": "free1" }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.header("ratelimit-remaining"),
            expected_remaining.to_string().as_str()
        );
    }

    let response = authorized(app.server.post("/url/check_alias"))
        .json(&json!({ "alias": "free1" }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .header("retry-after")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);
    let body: Value = response.json();
    assert_eq!(body["message"], "too many requests");
}

#[tokio::test]
async fn test_rate_keys_are_per_route() {
    let app = TestApp::new();

    for _ in 0..5 {
        authorized(app.server.post("/url/check_alias"))
            .json(&json!({ "alias": "free1" }))
            .await
            .assert_status_ok();
    }

    authorized(app.server.post("/url/guest"))
        .json(&json!({ "originalUrl": "https://example.com" }))
        .await
        .assert_status(StatusCode::CREATED);
}

// ─── PAYLOAD ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = TestApp::new();

    let response = authorized(app.server.post("/url/guest"))
        .text("{\"originalUrl\":")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "invalid payload");
}

#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let app = TestApp::new();

    let response = authorized(app.server.post("/url/guest"))
        .json(&json!({ "originalUrl": "https://example.com", "expires": 3600 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.links.is_empty());
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let app = TestApp::new();

    let response = authorized(app.server.post("/url/guest"))
        .json(&json!({ "originalUrl": "not a url" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Validation error:")
    );
}

#[tokio::test]
async fn test_alias_outside_alphabet_is_rejected() {
    let app = TestApp::new();

    let response = authorized(app.server.post("/url/guest"))
        .json(&json!({ "originalUrl": "https://example.com", "alias": "a/b/c" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.links.is_empty());
}

// ─── FALLBACKS ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();

    let response = app.server.get("/nowhere").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["message"], "Resource Not Found");
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["path"], "/nowhere");
}

#[tokio::test]
async fn test_wrong_method() {
    let app = TestApp::new();

    let response = app.server.put("/url/guest").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Method Not Allowed");
    assert_eq!(body["method"], "PUT");
}
