//! Test infrastructure for deterministic API testing.
//!
//! Provides an in-process test environment with a controllable clock, a
//! fresh payload store per test, and helpers that drive the router without
//! binding a socket.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use adrelay_api::AppState;
pub use adrelay_core::{ClientPayloadStore, Clock, TestClock};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

mod env_core;
pub mod fixtures;

pub use env_core::TestEnvBuilder;
pub use fixtures::{daily_campaign, weekly_campaigns, CampaignBuilder};

/// Test environment with an isolated store and router.
pub struct TestEnv {
    /// Deterministic clock shared by the store and handlers
    pub clock: TestClock,
    /// Application state backing the router
    state: AppState,
    /// Router under test
    router: Router,
}

/// Decoded response from the router.
#[derive(Debug)]
pub struct TestResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// JSON body, or `Value::Null` when the body is not JSON
    pub body: Value,
}

impl TestEnv {
    /// Creates an environment with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for customised environments.
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Store behind the router.
    pub fn store(&self) -> Arc<ClientPayloadStore> {
        Arc::clone(&self.state.store)
    }

    /// Clock as a trait object, for constructing extra components.
    pub fn clock_arc(&self) -> Arc<dyn Clock> {
        Arc::new(self.clock.clone())
    }

    /// Advances both the monotonic and wall clocks.
    pub fn advance_time(&self, duration: std::time::Duration) {
        self.clock.advance(duration);
    }

    /// Sends a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read, which is a test
    /// failure either way.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response =
            self.router.clone().oneshot(request).await.expect("router should not fail");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should be readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, headers, body }
    }

    /// Sends a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(build_request(Method::GET, uri, Body::empty())).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.post_raw(uri, body.to_string()).await
    }

    /// Sends a POST request with arbitrary bytes labelled as JSON.
    pub async fn post_raw(&self, uri: &str, body: impl Into<bytes::Bytes>) -> TestResponse {
        self.send(build_request(Method::POST, uri, Body::from(body.into()))).await
    }

    /// Posts a daily payload for `client_id`.
    pub async fn ingest_daily(&self, client_id: &str, body: &Value) -> TestResponse {
        self.post_json(&format!("/webhook/meta-ads/{client_id}"), body).await
    }

    /// Posts a weekly payload for `client_id`.
    pub async fn ingest_weekly(&self, client_id: &str, body: &Value) -> TestResponse {
        self.post_json(&format!("/webhook/meta-ads-weekly/{client_id}"), body).await
    }

    /// Fetches the latest payload for `client_id`.
    pub async fn latest(&self, client_id: &str) -> TestResponse {
        self.get(&format!("/webhook/meta-ads/{client_id}/latest")).await
    }

    /// Fetches the retained history for `client_id`.
    pub async fn history(&self, client_id: &str) -> TestResponse {
        self.get(&format!("/webhook/meta-ads/{client_id}/history")).await
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn build_request(method: Method, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("test request should be valid")
}
