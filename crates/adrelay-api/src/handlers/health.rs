//! Health check handlers for service monitoring.
//!
//! Provides health and liveness endpoints for hosting platforms and load
//! balancers. Neither endpoint touches the store: the payload store lives in
//! process memory, so a responding process has a usable store.

use std::sync::Arc;

use adrelay_core::Clock;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests
    pub status: &'static str,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Configured service name
    pub service: String,
    /// Service version information
    pub version: &'static str,
}

/// Health service that encapsulates clock dependency for testable health
/// checks.
pub struct HealthService {
    clock: Arc<dyn Clock>,
}

impl HealthService {
    /// Creates a new health service with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Builds the health report for `service`.
    pub fn health_check(&self, service: &str) -> HealthResponse {
        debug!("Performing health check");

        HealthResponse {
            status: "healthy",
            timestamp: self.clock.now_utc(),
            service: service.to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Health check endpoint handler.
///
/// Called frequently by orchestration systems and load balancers, so it
/// avoids expensive operations.
#[instrument(name = "health_check", skip(app_state))]
pub async fn health_check(State(app_state): State<AppState>) -> Response {
    let health_service = HealthService::new(app_state.clock.clone());
    let response = health_service.health_check(&app_state.service_name);

    debug!(timestamp = %response.timestamp, "Health check completed");

    (StatusCode::OK, Json(response)).into_response()
}

/// Liveness check endpoint.
///
/// Returns a simple response indicating the service process is alive.
#[instrument(name = "liveness_check", skip(app_state))]
pub async fn liveness_check(State(app_state): State<AppState>) -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": app_state.clock.now_utc(),
        "service": app_state.service_name,
    });

    (StatusCode::OK, Json(response)).into_response()
}
