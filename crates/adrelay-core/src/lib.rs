//! Core domain models and the per-client payload store.
//!
//! Provides strongly-typed client identifiers, payload records, the error
//! taxonomy, a clock abstraction and the concurrent `ClientPayloadStore`
//! that the HTTP layer ingests into and reads from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod store;
pub mod time;

pub use error::{RelayError, Result};
pub use models::{Ack, ClientId, ClientSummary, PayloadKind, PayloadRecord, ServerStatus};
pub use store::{ClientPayloadStore, StoreConfig};
pub use time::{Clock, RealClock, TestClock};
