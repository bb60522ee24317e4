//! Health check endpoint tests.
//!
//! Verifies the `/health` and `/live` endpoints respond with structured JSON
//! and never touch stored payloads.

use adrelay_testing::TestEnv;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_check_returns_success_when_healthy() {
    let env = TestEnv::new();

    let response = env.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["service"], "Meta Ads Webhook");
    assert!(response.body.get("checks").is_none());
    assert_eq!(response.body["version"], env!("CARGO_PKG_VERSION"));
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn liveness_check_reports_alive() {
    let env = TestEnv::new();

    let response = env.get("/live").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "alive");
    assert_eq!(response.body["service"], "Meta Ads Webhook");
}

#[tokio::test]
async fn health_endpoints_do_not_mutate_store() {
    let env = TestEnv::new();
    env.ingest_daily("snob-motel", &json!({"spend": 1})).await;
    let before = env.store().status();

    for _ in 0..3 {
        env.get("/health").await;
        env.get("/live").await;
    }

    assert_eq!(env.store().status(), before);
    assert_eq!(env.store().latest("snob-motel").unwrap().unwrap().body, json!({"spend": 1}));
}
