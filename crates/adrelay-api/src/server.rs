//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response tracing
//! 3. Timeout enforcement
//! 4. Body size limit (ingest routes)
//! 5. Handler execution
//!
//! # Graceful Shutdown
//!
//! On SIGINT or SIGTERM the server stops accepting new connections and
//! waits for in-flight requests. Stored payloads are not persisted.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{handlers, AppState};

/// Request timeout used by [`create_router`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use adrelay_api::{create_router, AppState, Config};
/// use adrelay_core::RealClock;
///
/// let state = AppState::from_config(&Config::default(), Arc::new(RealClock::new()));
/// let app = create_router(state);
/// ```
pub fn create_router(state: AppState) -> Router {
    create_router_with_timeout(state, DEFAULT_REQUEST_TIMEOUT)
}

/// Creates the router with an explicit request timeout.
pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/live", get(handlers::liveness_check));

    let status_routes = Router::new()
        .route("/", get(handlers::service_status))
        .route("/status", get(handlers::service_status))
        .route("/clients", get(handlers::list_clients));

    let ingest_routes = Router::new()
        .route("/webhook/meta-ads/{client_id}", post(handlers::ingest_daily))
        .route("/webhook/meta-ads-weekly/{client_id}", post(handlers::ingest_weekly))
        .route("/webhook/meta-ads/", post(handlers::missing_client))
        .route("/webhook/meta-ads-weekly/", post(handlers::missing_client))
        .layer(DefaultBodyLimit::max(state.max_payload_bytes));

    let retrieval_routes = Router::new()
        .route("/webhook/meta-ads/{client_id}/latest", get(handlers::get_latest))
        .route("/webhook/meta-ads/{client_id}/history", get(handlers::get_history));

    Router::new()
        .merge(health_routes)
        .merge(status_routes)
        .merge(ingest_routes)
        .merge(retrieval_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
///
/// Adds X-Request-Id header for correlating automation runs with logs.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Binds to the specified address and serves requests until a shutdown
/// signal is received.
///
/// # Errors
///
/// Returns `std::io::Error` if:
/// - Port is already in use
/// - Network interface unavailable
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let app = create_router_with_timeout(state, request_timeout);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Draining in-flight requests; in-memory payloads will be discarded");
}
