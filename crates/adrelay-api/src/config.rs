//! Configuration management for the adrelay service.

use std::{collections::HashSet, net::SocketAddr, str::FromStr, time::Duration};

use adrelay_core::{ClientId, StoreConfig};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Environment variables read by [`Config::load`], matched case-insensitively.
const ENV_KEYS: &[&str] = &[
    "host",
    "port",
    "request_timeout",
    "max_payload_bytes",
    "history_limit",
    "allowed_clients",
    "service_name",
    "rust_log",
    "log_json",
];

/// Service configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// # Example
///
/// ```no_run
/// use adrelay_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST", deserialize_with = "string_like")]
    pub host: String,
    /// Server bind port. Hosting platforms usually inject this.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,
    /// Largest accepted webhook body in bytes.
    ///
    /// Environment variable: `MAX_PAYLOAD_BYTES`
    #[serde(default = "default_max_payload_bytes", alias = "MAX_PAYLOAD_BYTES")]
    pub max_payload_bytes: usize,

    // Store
    /// Payloads retained per client, including the latest one.
    ///
    /// Environment variable: `HISTORY_LIMIT`
    #[serde(default = "default_history_limit", alias = "HISTORY_LIMIT")]
    pub history_limit: usize,
    /// Clients allowed to submit payloads. Empty accepts any client.
    ///
    /// Environment variable: `ALLOWED_CLIENTS` (comma-separated)
    #[serde(default, alias = "ALLOWED_CLIENTS", deserialize_with = "string_or_list")]
    pub allowed_clients: Vec<String>,

    // Presentation
    /// Name reported by the status route.
    ///
    /// Environment variable: `SERVICE_NAME`
    #[serde(
        default = "default_service_name",
        alias = "SERVICE_NAME",
        deserialize_with = "string_like"
    )]
    pub service_name: String,

    // Logging
    /// Log filter. Also read from `RUST_LOG`.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG", deserialize_with = "string_like")]
    pub rust_log: String,
    /// Emit logs as JSON lines instead of human-readable text.
    ///
    /// Environment variable: `LOG_JSON`
    #[serde(default, alias = "LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed or the merged values are invalid.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Self::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::raw().only(ENV_KEYS)),
        )
    }

    /// Extracts and validates configuration from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Fails when extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the store configuration.
    pub fn to_store_config(&self) -> StoreConfig {
        let allowed_clients = if self.allowed_clients.is_empty() {
            None
        } else {
            Some(
                self.allowed_clients
                    .iter()
                    .filter_map(|id| ClientId::parse(id).ok())
                    .collect::<HashSet<_>>(),
            )
        };

        StoreConfig { history_limit: self.history_limit, allowed_clients }
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Parse server socket address from host and port configuration.
    ///
    /// # Errors
    ///
    /// Fails when `host` is not an IP address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.max_payload_bytes == 0 {
            anyhow::bail!("max_payload_bytes must be greater than 0");
        }

        if self.history_limit == 0 {
            anyhow::bail!("history_limit must be greater than 0");
        }

        if self.allowed_clients.iter().any(String::is_empty) {
            anyhow::bail!("allowed_clients must not contain empty client ids");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            max_payload_bytes: default_max_payload_bytes(),
            history_limit: default_history_limit(),
            allowed_clients: Vec::new(),
            service_name: default_service_name(),
            rust_log: default_log_level(),
            log_json: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_payload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_history_limit() -> usize {
    1
}

fn default_service_name() -> String {
    "Meta Ads Webhook".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A scalar rendered as text. Environment values that look like numbers or
/// booleans reach serde already typed.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Int(n) => n.to_string(),
            Scalar::Uint(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Accepts any scalar as a string, so `SERVICE_NAME=2024` loads.
fn string_like<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(String::from)
}

/// Accepts either a TOML array or a comma-separated string.
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Scalar),
        Many(Vec<Scalar>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(joined) => String::from(joined)
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
        OneOrMany::Many(ids) => ids.into_iter().map(String::from).collect(),
    })
}
