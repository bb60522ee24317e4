//! HTTP request handlers for the adrelay API.
//!
//! Handlers follow one pattern: extract, call the store, log with
//! structured fields, and turn any `RelayError` into the standard error
//! body through [`crate::error::create_error_response`].
//!
//! # Handler Organization
//!
//! - `ingest` - Daily and weekly webhook ingestion
//! - `payloads` - Latest payload, history and client listing
//! - `status` - Service status document
//! - `health` - Health and liveness probes

pub mod health;
pub mod ingest;
pub mod payloads;
pub mod status;

pub use health::{health_check, liveness_check};
pub use ingest::{ingest_daily, ingest_weekly, missing_client};
pub use payloads::{get_history, get_latest, list_clients};
pub use status::service_status;
