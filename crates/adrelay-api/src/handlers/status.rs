//! Service status handler.

use adrelay_core::ServerStatus;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::AppState;

/// Status document served on `/` and `/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `"online"` while the process serves requests
    pub status: &'static str,
    /// Configured service name
    pub service: String,
    /// Crate version
    pub version: &'static str,
    /// Store snapshot
    #[serde(flatten)]
    pub store: ServerStatus,
}

/// Reports that the service is online along with store counters.
#[instrument(name = "service_status", skip(state))]
pub async fn service_status(State(state): State<AppState>) -> Response {
    let store = state.store.status();
    debug!(clients = store.clients, total_ingests = store.total_ingests, "Status requested");

    let response = StatusResponse {
        status: "online",
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        store,
    };

    (StatusCode::OK, Json(response)).into_response()
}
