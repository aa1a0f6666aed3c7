#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use cardsmith_api::config::ServerConfig;
use cardsmith_api::router::build_app_router;
use cardsmith_api::state::AppState;
use cardsmith_bridge::{Ack, BridgeRequest, CompletionSink, Transport, TransportError};
use cardsmith_db::SessionFileStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(profile_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        profile_dir: profile_dir.to_path_buf(),
        database_url: "sqlite::memory:".to_string(),
        generation_worker_url: "http://127.0.0.1:8765".to_string(),
        public_url: "http://127.0.0.1:3000".to_string(),
        generation_timeout_secs: 120,
        card_limit: 20,
    }
}

/// Transport that acknowledges every request (or refuses with `reject`)
/// and records what it was sent.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<BridgeRequest>>,
    pub reject: Mutex<Option<String>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: BridgeRequest, _sink: CompletionSink) -> Result<Ack, TransportError> {
        self.sent.lock().unwrap().push(request);
        match self.reject.lock().unwrap().clone() {
            Some(reason) => Ok(Ack::Rejected(reason)),
            None => Ok(Ack::Started),
        }
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub transport: Arc<RecordingTransport>,
    pub sessions: Arc<SessionFileStore>,
    _profile: TempDir,
}

/// Build the full application over an in-memory collection and a
/// temporary profile directory.
pub async fn build_test_app() -> TestApp {
    let profile = tempfile::tempdir().unwrap();
    let config = test_config(profile.path());

    let pool = cardsmith_db::create_memory_pool().await.unwrap();
    cardsmith_db::run_migrations(&pool).await.unwrap();

    let transport = Arc::new(RecordingTransport::default());
    let sessions = Arc::new(SessionFileStore::in_profile(profile.path()));
    let state = AppState::new(pool, config.clone(), transport.clone(), sessions.clone());
    let app = build_app_router(state.clone(), &config);

    TestApp {
        app,
        state,
        transport,
        sessions,
        _profile: profile,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `GET /api/v1/workflow` until it reports `state`.
pub async fn wait_for_state(app: &Router, state: &str) -> Value {
    for _ in 0..100 {
        let json = body_json(get(app, "/api/v1/workflow").await).await;
        if json["data"]["state"] == state {
            return json["data"].clone();
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("workflow never reached state '{state}'");
}
