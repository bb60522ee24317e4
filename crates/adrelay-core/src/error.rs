//! Error types and result handling for relay operations.
//!
//! Defines the error taxonomy with stable codes so HTTP clients can tell an
//! invalid request apart from a missing payload. Absence of a payload is not
//! an error and is modelled as `Option::None` by the store.

use thiserror::Error;

/// Result type alias using `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error types with codes exposed in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Client identifier missing or empty (E1001).
    #[error("[E1001] Invalid client id: client id must not be empty")]
    InvalidClientId,

    /// Client identifier not present in the configured allowlist (E1002).
    #[error("[E1002] Unknown client: {client_id} is not configured")]
    UnknownClient {
        /// The client identifier that was rejected
        client_id: String,
    },

    /// Request body exceeds the configured size limit (E1003).
    #[error("[E1003] Payload too large: body exceeds {limit_bytes} bytes")]
    PayloadTooLarge {
        /// Configured maximum body size in bytes
        limit_bytes: usize,
    },

    /// Request body could not be parsed as JSON (E1004).
    #[error("[E1004] Invalid payload: {reason}")]
    InvalidPayload {
        /// Parser error description
        reason: String,
    },
}

impl RelayError {
    /// Returns the error code (E1001-E1004).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidClientId => "E1001",
            Self::UnknownClient { .. } => "E1002",
            Self::PayloadTooLarge { .. } => "E1003",
            Self::InvalidPayload { .. } => "E1004",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(RelayError::InvalidClientId.code(), "E1001");
        assert_eq!(RelayError::UnknownClient { client_id: "x".into() }.code(), "E1002");
        assert_eq!(RelayError::PayloadTooLarge { limit_bytes: 1 }.code(), "E1003");
        assert_eq!(RelayError::InvalidPayload { reason: "eof".into() }.code(), "E1004");
    }

    #[test]
    fn messages_carry_code_prefix() {
        let error = RelayError::UnknownClient { client_id: "maria-cristina".into() };
        let message = error.to_string();

        assert!(message.starts_with("[E1002]"));
        assert!(message.contains("maria-cristina"));
    }
}
