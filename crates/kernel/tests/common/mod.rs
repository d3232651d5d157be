#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Every test builds its own [`TestApp`] over in-memory stores, so tests
//! never share rows and need no database.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use croogo_kernel::hooks::HookRegistry;
use croogo_kernel::plugin::bootstrap_dir;
use croogo_kernel::{AppState, routes};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Fresh application with no plugins.
    pub fn new() -> Self {
        Self::with_state(AppState::in_memory().expect("Failed to initialize AppState"))
    }

    /// Fresh application with the plugins under `plugins_dir` bootstrapped.
    pub fn with_plugins(plugins_dir: &Path) -> Self {
        let hooks = HookRegistry::new();
        let plugins = bootstrap_dir(plugins_dir, &hooks).expect("Failed to bootstrap plugins");
        let state = AppState::from_parts(
            None,
            std::sync::Arc::new(croogo_kernel::taxonomy::MemoryTaxonomyStore::new()),
            std::sync::Arc::new(croogo_kernel::menu::MemoryMenuStore::new()),
            hooks,
            plugins,
        )
        .expect("Failed to initialize AppState");
        Self::with_state(state)
    }

    fn with_state(state: AppState) -> Self {
        let router = routes::app(state.clone());
        Self { router, state }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri`, returning status and JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST a JSON body.
    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    /// PUT a JSON body.
    pub async fn put(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }

    /// DELETE `uri`.
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.request(request).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Create a vocabulary over HTTP and return its id.
    pub async fn create_vocabulary(&self, alias: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/vocabularies",
                &croogo_test_utils::test_vocabulary(alias),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create vocabulary: {body}");
        body["id"].as_i64().unwrap()
    }

    /// Add a term to a vocabulary over HTTP and return the taxonomy row.
    pub async fn add_term(&self, vocabulary_id: i64, term: &croogo_test_utils::TestTerm) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/vocabularies/{vocabulary_id}/terms"),
                &term.to_json(),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add term: {body}");
        body
    }
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body as JSON; empty bodies become `null`.
pub async fn response_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Response is not JSON")
}

/// The checked-in plugin fixtures.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/plugins")
}

/// A scratch directory unique to this process and `name`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("croogo_test_{}_{name}", std::process::id()));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}
