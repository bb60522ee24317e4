//! adrelay webhook relay service.
//!
//! Main entry point. Loads configuration, installs logging, and serves the
//! ingestion and retrieval API until a shutdown signal arrives.

use std::sync::Arc;

use adrelay_api::{AppState, Config};
use adrelay_core::RealClock;
use anyhow::{Context, Result};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config);

    info!(
        host = %config.host,
        port = config.port,
        history_limit = config.history_limit,
        max_payload_bytes = config.max_payload_bytes,
        allowed_clients = config.allowed_clients.len(),
        "Configuration loaded"
    );

    let addr = config.parse_server_addr()?;
    let state = AppState::from_config(&config, Arc::new(RealClock::new()));

    info!(addr = %addr, service = %config.service_name, "adrelay is ready to receive webhooks");

    adrelay_api::start_server(state, addr, config.request_timeout())
        .await
        .context("HTTP server failed")?;

    info!("adrelay shutdown complete");
    Ok(())
}

/// Initializes tracing from `RUST_LOG`, falling back to the configured
/// filter.
fn init_tracing(config: &Config) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.rust_log))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry.with(fmt::layer().json().with_current_span(true).with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .init();
    }
}
