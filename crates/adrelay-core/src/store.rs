//! Concurrent per-client payload store.
//!
//! Keeps the most recent payload, plus a bounded history, for every client
//! that has submitted one. Clients live in a sharded map: an ingest holds the
//! write lock of its client's shard only, so writes for different clients
//! never wait on a store-wide lock, and two writes for the same client are
//! applied one after the other (last write wins).
//!
//! # Ordering
//!
//! `received_at` is assigned under the shard lock and clamped to the previous
//! record's timestamp, so it never decreases for a client even if the wall
//! clock steps back. `sequence` counts accepted writes per client.

use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{RelayError, Result},
    models::{Ack, ClientId, ClientSummary, PayloadKind, PayloadRecord, ServerStatus},
    time::Clock,
};

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Records retained per client, including the latest. Values below 1 are
    /// treated as 1.
    pub history_limit: usize,
    /// When set, only these clients may ingest or be queried.
    pub allowed_clients: Option<HashSet<ClientId>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { history_limit: 1, allowed_clients: None }
    }
}

/// Per-client state. The latest record is the back of `history`.
#[derive(Debug, Default)]
struct ClientState {
    history: VecDeque<Arc<PayloadRecord>>,
    ingest_count: u64,
}

impl ClientState {
    fn latest(&self) -> Option<&Arc<PayloadRecord>> {
        self.history.back()
    }
}

/// Thread-safe store of the latest payload per client.
///
/// Constructed once at startup and shared by `Arc` with the HTTP layer. All
/// operations are synchronous and complete without I/O.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use adrelay_core::{ClientPayloadStore, PayloadKind, RealClock, StoreConfig};
/// use serde_json::json;
///
/// let store = ClientPayloadStore::new(StoreConfig::default(), Arc::new(RealClock::new()));
///
/// let ack = store.ingest("snob-motel", PayloadKind::Daily, json!({"spend": 100})).unwrap();
/// assert_eq!(ack.sequence, 1);
///
/// let latest = store.latest("snob-motel").unwrap().unwrap();
/// assert_eq!(latest.body, json!({"spend": 100}));
/// assert!(store.latest("unknown-client").unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct ClientPayloadStore {
    config: StoreConfig,
    clients: DashMap<ClientId, ClientState>,
    clock: Arc<dyn Clock>,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
    total_ingests: AtomicU64,
}

impl ClientPayloadStore {
    /// Creates an empty store.
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let config = StoreConfig { history_limit: config.history_limit.max(1), ..config };

        Self {
            started_at: clock.now(),
            started_at_utc: clock.now_utc(),
            config,
            clients: DashMap::new(),
            clock,
            total_ingests: AtomicU64::new(0),
        }
    }

    /// Records `body` as the latest payload for `client_id`.
    ///
    /// Creates the client's state on first use, appends to its history and
    /// trims the history to the configured limit.
    ///
    /// # Errors
    ///
    /// - `RelayError::InvalidClientId` if `client_id` is empty
    /// - `RelayError::UnknownClient` if an allowlist is configured and does
    ///   not contain `client_id`
    ///
    /// The store is not modified when an error is returned.
    pub fn ingest(&self, client_id: &str, kind: PayloadKind, body: Value) -> Result<Ack> {
        let client_id = self.authorize(client_id)?;

        let mut state = self.clients.entry(client_id.clone()).or_default();

        let now = self.clock.now_utc();
        let received_at = match state.latest() {
            Some(previous) if previous.received_at > now => previous.received_at,
            _ => now,
        };
        state.ingest_count += 1;

        let sequence = state.ingest_count;
        let record = Arc::new(PayloadRecord { client_id, received_at, sequence, kind, body });

        state.history.push_back(Arc::clone(&record));
        while state.history.len() > self.config.history_limit {
            state.history.pop_front();
        }
        drop(state);

        self.total_ingests.fetch_add(1, Ordering::Relaxed);

        debug!(
            client_id = %record.client_id,
            kind = %record.kind,
            sequence = record.sequence,
            "Payload stored"
        );

        Ok(Ack::from(record.as_ref()))
    }

    /// Returns the latest payload for `client_id`, or `None` if the client
    /// has never submitted one.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`ingest`](Self::ingest).
    pub fn latest(&self, client_id: &str) -> Result<Option<Arc<PayloadRecord>>> {
        let client_id = self.authorize(client_id)?;

        Ok(self.clients.get(&client_id).and_then(|state| state.latest().cloned()))
    }

    /// Returns the retained history for `client_id`, oldest first.
    ///
    /// Empty for a client that has never submitted a payload.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`ingest`](Self::ingest).
    pub fn history(&self, client_id: &str) -> Result<Vec<Arc<PayloadRecord>>> {
        let client_id = self.authorize(client_id)?;

        Ok(self
            .clients
            .get(&client_id)
            .map(|state| state.history.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Lists every client with at least one payload, sorted by id.
    pub fn clients(&self) -> Vec<ClientSummary> {
        let mut summaries: Vec<ClientSummary> = self
            .clients
            .iter()
            .filter_map(|entry| {
                entry.value().latest().map(|latest| ClientSummary {
                    client_id: entry.key().clone(),
                    ingest_count: entry.value().ingest_count,
                    last_received_at: latest.received_at,
                })
            })
            .collect();

        summaries.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        summaries
    }

    /// Returns a process-wide snapshot: uptime, known clients, total ingests.
    pub fn status(&self) -> ServerStatus {
        ServerStatus {
            started_at: self.started_at_utc,
            uptime_seconds: self.clock.now().saturating_duration_since(self.started_at).as_secs(),
            clients: self.clients.len(),
            total_ingests: self.total_ingests.load(Ordering::Relaxed),
        }
    }

    /// Returns the number of records retained per client.
    pub fn history_limit(&self) -> usize {
        self.config.history_limit
    }

    /// Validates `raw` and checks it against the allowlist, if any.
    ///
    /// Lets callers reject a client before doing any work on its payload.
    ///
    /// # Errors
    ///
    /// - `RelayError::InvalidClientId` if `raw` is empty
    /// - `RelayError::UnknownClient` if an allowlist is configured and does
    ///   not contain `raw`
    pub fn authorize(&self, raw: &str) -> Result<ClientId> {
        let client_id = ClientId::parse(raw)?;

        if let Some(allowed) = &self.config.allowed_clients {
            if !allowed.contains(&client_id) {
                warn!(client_id = %client_id, "Rejected client not present in allowlist");
                return Err(RelayError::UnknownClient { client_id: raw.to_string() });
            }
        }

        Ok(client_id)
    }
}
