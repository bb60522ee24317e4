//! Retrieval handlers for stored payloads.
//!
//! A client that has never submitted a payload is reported as `absent` with
//! a 404, which is distinguishable from a 400 for an invalid client id.

use std::sync::Arc;

use adrelay_core::{ClientSummary, PayloadRecord};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{error::create_error_response, AppState};

/// Lookup result for the latest payload of a client.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LatestResponse {
    /// A payload is stored for the client.
    Found {
        /// The most recent record
        record: Arc<PayloadRecord>,
    },
    /// Nothing has been received for the client yet.
    Absent {
        /// The client that was looked up
        client_id: String,
    },
}

/// Retained history of a client, oldest first.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// The client that was looked up
    pub client_id: String,
    /// Retained records, ending with the latest
    pub records: Vec<Arc<PayloadRecord>>,
}

/// Known clients.
#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    /// One summary per client, sorted by id
    pub clients: Vec<ClientSummary>,
}

/// Returns the latest payload for a client.
#[instrument(name = "get_latest", skip(state), fields(client_id = %client_id))]
pub async fn get_latest(Path(client_id): Path<String>, State(state): State<AppState>) -> Response {
    match state.store.latest(&client_id) {
        Ok(Some(record)) => {
            debug!(sequence = record.sequence, "Latest payload found");
            (StatusCode::OK, Json(LatestResponse::Found { record })).into_response()
        },
        Ok(None) => {
            debug!("No payload stored for client");
            (StatusCode::NOT_FOUND, Json(LatestResponse::Absent { client_id })).into_response()
        },
        Err(e) => create_error_response(&e),
    }
}

/// Returns the retained history for a client.
#[instrument(name = "get_history", skip(state), fields(client_id = %client_id))]
pub async fn get_history(Path(client_id): Path<String>, State(state): State<AppState>) -> Response {
    match state.store.history(&client_id) {
        Ok(records) => {
            debug!(records = records.len(), "History retrieved");
            (StatusCode::OK, Json(HistoryResponse { client_id, records })).into_response()
        },
        Err(e) => create_error_response(&e),
    }
}

/// Lists every client with at least one stored payload.
#[instrument(name = "list_clients", skip(state))]
pub async fn list_clients(State(state): State<AppState>) -> Response {
    let clients = state.store.clients();
    debug!(clients = clients.len(), "Listed clients");

    (StatusCode::OK, Json(ClientsResponse { clients })).into_response()
}
