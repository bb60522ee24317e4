//! Domain models and strongly-typed identifiers.
//!
//! Defines the client identifier newtype, the payload record kept by the
//! store, and the acknowledgement and status snapshots handed back to the
//! HTTP layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Strongly-typed client identifier.
///
/// Partition key for every store operation. The only structural rule is that
/// it must be non-empty, so a `ClientId` can only be obtained through
/// [`ClientId::parse`] or `TryFrom`.
///
/// # Example
///
/// ```
/// use adrelay_core::ClientId;
///
/// let client = ClientId::parse("snob-motel").unwrap();
/// assert_eq!(client.as_str(), "snob-motel");
/// assert!(ClientId::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Validates and wraps a raw client identifier.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidClientId` when `raw` is empty.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RelayError::InvalidClientId);
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ClientId {
    type Error = RelayError;

    fn try_from(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for ClientId {
    type Error = RelayError;

    fn try_from(raw: String) -> Result<Self> {
        if raw.is_empty() {
            return Err(RelayError::InvalidClientId);
        }
        Ok(Self(raw))
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

/// Inbound route a payload arrived on.
///
/// Metadata only: daily and weekly payloads for a client share the same
/// `latest` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Daily metrics object.
    Daily,
    /// Weekly list of campaign objects.
    Weekly,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
        }
    }
}

/// One received webhook submission.
///
/// `received_at` and `sequence` are assigned by the store; `body` is kept
/// exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadRecord {
    /// Owner of this payload.
    pub client_id: ClientId,
    /// Store-assigned receipt time.
    pub received_at: DateTime<Utc>,
    /// Per-client ingest counter, starting at 1.
    pub sequence: u64,
    /// Route the payload arrived on.
    pub kind: PayloadKind,
    /// Opaque payload body.
    pub body: serde_json::Value,
}

/// Acknowledgement returned by a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Client the payload was recorded for.
    pub client_id: ClientId,
    /// Route the payload arrived on.
    pub kind: PayloadKind,
    /// Store-assigned receipt time.
    pub received_at: DateTime<Utc>,
    /// Per-client ingest counter of the stored record.
    pub sequence: u64,
}

impl From<&PayloadRecord> for Ack {
    fn from(record: &PayloadRecord) -> Self {
        Self {
            client_id: record.client_id.clone(),
            kind: record.kind,
            received_at: record.received_at,
            sequence: record.sequence,
        }
    }
}

/// Per-client summary for listing known clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    /// Client identifier.
    pub client_id: ClientId,
    /// Payloads accepted for this client since process start.
    pub ingest_count: u64,
    /// Receipt time of the latest payload.
    pub last_received_at: DateTime<Utc>,
}

/// Process-wide store snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    /// When the store was created.
    pub started_at: DateTime<Utc>,
    /// Whole seconds since the store was created.
    pub uptime_seconds: u64,
    /// Number of distinct clients with at least one payload.
    pub clients: usize,
    /// Payloads accepted across all clients.
    pub total_ingests: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_client_id_is_rejected() {
        assert_eq!(ClientId::parse(""), Err(RelayError::InvalidClientId));
        assert_eq!(ClientId::try_from(String::new()), Err(RelayError::InvalidClientId));
    }

    #[test]
    fn client_id_keeps_raw_value() {
        let id = ClientId::parse(" spaced id ").unwrap();

        assert_eq!(id.as_str(), " spaced id ");
        assert_eq!(id.to_string(), " spaced id ");
    }

    #[test]
    fn client_id_serializes_as_plain_string() {
        let id = ClientId::parse("snob-motel").unwrap();

        assert_eq!(serde_json::to_value(&id).unwrap(), json!("snob-motel"));
        assert!(serde_json::from_value::<ClientId>(json!("")).is_err());
    }

    #[test]
    fn payload_kind_uses_lowercase_names() {
        assert_eq!(serde_json::to_value(PayloadKind::Weekly).unwrap(), json!("weekly"));
        assert_eq!(PayloadKind::Daily.to_string(), "daily");
    }
}
