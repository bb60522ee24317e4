//! TestEnv construction.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use adrelay_api::{create_router, AppState, Config};

use crate::{TestClock, TestEnv};

/// Wall-clock start used unless a test picks its own: 2023-11-14T22:13:20Z.
const DEFAULT_START_SECS: u64 = 1_700_000_000;

/// Builder for configuring a TestEnv.
pub struct TestEnvBuilder {
    config: Config,
    start_time: SystemTime,
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            start_time: UNIX_EPOCH + Duration::from_secs(DEFAULT_START_SECS),
        }
    }
}

impl TestEnvBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many payloads are retained per client (default: 1).
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Restricts ingestion to the given clients.
    #[must_use]
    pub fn allowed_clients<I, S>(mut self, clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_clients = clients.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the request body limit (default: 10 MiB).
    #[must_use]
    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.config.max_payload_bytes = limit;
        self
    }

    /// Sets the service name reported by the status route.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Sets the wall-clock time the test clock starts at.
    #[must_use]
    pub fn start_time(mut self, start: SystemTime) -> Self {
        self.start_time = start;
        self
    }

    /// Builds the test environment.
    pub fn build(self) -> TestEnv {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
            )
            .with_test_writer()
            .try_init();

        let clock = TestClock::with_start_time(self.start_time);
        let state = AppState::from_config(&self.config, Arc::new(clock.clone()));
        let router = create_router(state.clone());

        TestEnv { clock, state, router }
    }
}
