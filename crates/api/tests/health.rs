//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;
use tower::ServiceExt;

async fn preflight(app: &Router, origin: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/session")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let t = build_test_app().await;
    let response = get(&t.app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["generation_pending"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let t = build_test_app().await;
    let response = get(&t.app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let t = build_test_app().await;
    let response = get(&t.app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn error_bodies_carry_code_and_message() {
    let t = build_test_app().await;
    let response = post_json(
        &t.app,
        "/api/v1/workflow/generate",
        json!({ "sourceName": "empty.txt", "text": "   " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Source text is empty");
}

#[tokio::test]
async fn preflight_from_configured_origin_is_allowed_without_credentials() {
    let t = build_test_app().await;
    let response = preflight(&t.app, "http://localhost:5173").await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

#[tokio::test]
async fn preflight_from_other_origin_gets_no_allow_origin() {
    let t = build_test_app().await;
    let response = preflight(&t.app, "http://evil.example").await;

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
