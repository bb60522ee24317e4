//! Error responses for the HTTP layer.

use adrelay_core::RelayError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the relay taxonomy (E1001-E1004)
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

/// Maps a relay error to its HTTP status.
pub const fn status_for(error: &RelayError) -> StatusCode {
    match error {
        RelayError::InvalidClientId | RelayError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
        RelayError::UnknownClient { .. } => StatusCode::FORBIDDEN,
        RelayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
    }
}

/// Creates a standardized error response.
pub fn create_error_response(error: &RelayError) -> Response {
    let error_response = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };

    (status_for(error), Json(error_response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_uses_mapped_status() {
        let response = create_error_response(&RelayError::PayloadTooLarge { limit_bytes: 1024 });

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn client_errors_map_to_distinct_statuses() {
        assert_eq!(status_for(&RelayError::InvalidClientId), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&RelayError::UnknownClient { client_id: "ghost".to_string() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&RelayError::InvalidPayload { reason: "eof".to_string() }),
            StatusCode::BAD_REQUEST
        );
    }
}
