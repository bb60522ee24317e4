//! adrelay HTTP API.
//!
//! Exposes the client payload store over HTTP: ingestion routes for the
//! automation that forwards Meta Ads payloads, retrieval routes for
//! downstream analysis, and status and health probes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use adrelay_core::{ClientPayloadStore, Clock};

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Per-client payload store.
    pub store: Arc<ClientPayloadStore>,
    /// Clock used for response timestamps.
    pub clock: Arc<dyn Clock>,
    /// Maximum accepted request body size in bytes.
    pub max_payload_bytes: usize,
    /// Service name reported by the status route.
    pub service_name: String,
}

impl AppState {
    /// Builds application state from configuration, creating a fresh store.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let store = ClientPayloadStore::new(config.to_store_config(), Arc::clone(&clock));

        Self {
            store: Arc::new(store),
            clock,
            max_payload_bytes: config.max_payload_bytes,
            service_name: config.service_name.clone(),
        }
    }
}
