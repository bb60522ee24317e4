//! Webhook ingestion handlers.
//!
//! Accepts the daily and weekly Meta Ads payloads forwarded by the
//! automation, parses the body as JSON and records it in the client's slot.
//! The client id is checked before the body is looked at. Body shape is never
//! inspected beyond being valid JSON.

use adrelay_core::{Ack, PayloadKind, RelayError};
use axum::{
    extract::{rejection::BytesRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{error::create_error_response, AppState};

/// Response from a successful ingest.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Always `"success"`
    pub status: &'static str,
    /// Human-readable confirmation
    pub message: String,
    /// Store acknowledgement with the assigned timestamp and sequence
    #[serde(flatten)]
    pub ack: Ack,
}

/// Ingests a daily payload for a client.
///
/// # Errors
///
/// Returns appropriate HTTP status codes:
/// - 400: Empty client id or body that is not valid JSON
/// - 403: Client not on the configured allowlist
/// - 413: Body larger than `max_payload_bytes`
#[instrument(
    name = "ingest_daily",
    skip(state, headers, body),
    fields(
        client_id = %client_id,
        content_length = headers.get("content-length").and_then(|v| v.to_str().ok()).unwrap_or("unknown"),
    )
)]
pub async fn ingest_daily(
    Path(client_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    ingest(&state, &client_id, PayloadKind::Daily, body)
}

/// Ingests a weekly payload for a client.
///
/// Weekly payloads are lists of campaign objects; a single JSON value that is
/// not an array is stored as a one-element array.
///
/// # Errors
///
/// Same as [`ingest_daily`].
#[instrument(
    name = "ingest_weekly",
    skip(state, headers, body),
    fields(
        client_id = %client_id,
        content_length = headers.get("content-length").and_then(|v| v.to_str().ok()).unwrap_or("unknown"),
    )
)]
pub async fn ingest_weekly(
    Path(client_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    ingest(&state, &client_id, PayloadKind::Weekly, body)
}

/// Handles an ingest route hit without a client id segment.
#[instrument(name = "ingest_missing_client")]
pub async fn missing_client() -> Response {
    warn!("Ingest request without client id");
    create_error_response(&RelayError::InvalidClientId)
}

fn ingest(
    state: &AppState,
    client_id: &str,
    kind: PayloadKind,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if let Err(e) = state.store.authorize(client_id) {
        warn!(error = %e, "Rejected client before reading body");
        return create_error_response(&e);
    }

    let body = match read_body(body, state.max_payload_bytes) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Rejected webhook body");
            return create_error_response(&e);
        },
    };

    let payload = match parse_payload(&body, kind) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, payload_size = body.len(), "Webhook body is not valid JSON");
            return create_error_response(&e);
        },
    };

    match state.store.ingest(client_id, kind, payload) {
        Ok(ack) => {
            info!(
                kind = %ack.kind,
                sequence = ack.sequence,
                received_at = %ack.received_at,
                payload_size = body.len(),
                "Payload stored"
            );
            let message = match kind {
                PayloadKind::Daily => "Daily payload stored",
                PayloadKind::Weekly => "Weekly payload stored",
            };
            (
                StatusCode::OK,
                Json(IngestResponse { status: "success", message: message.to_string(), ack }),
            )
                .into_response()
        },
        Err(e) => create_error_response(&e),
    }
}

/// Unwraps the buffered body, mapping an exceeded body limit to
/// `PayloadTooLarge`.
fn read_body(
    body: Result<Bytes, BytesRejection>,
    limit_bytes: usize,
) -> Result<Bytes, RelayError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::PayloadTooLarge { limit_bytes }
        } else {
            RelayError::InvalidPayload { reason: rejection.body_text() }
        }
    })
}

/// Parses a webhook body, wrapping weekly non-array values into an array.
///
/// # Errors
///
/// Returns `InvalidPayload` when the body is not valid JSON.
pub fn parse_payload(body: &[u8], kind: PayloadKind) -> Result<Value, RelayError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RelayError::InvalidPayload { reason: e.to_string() })?;

    Ok(match (kind, value) {
        (PayloadKind::Weekly, Value::Array(items)) => Value::Array(items),
        (PayloadKind::Weekly, single) => Value::Array(vec![single]),
        (PayloadKind::Daily, value) => value,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn daily_body_is_kept_as_is() {
        let body = br#"{"campaign_name":"Verao","spend":100}"#;

        let value = parse_payload(body, PayloadKind::Daily).unwrap();

        assert_eq!(value, json!({"campaign_name": "Verao", "spend": 100}));
    }

    #[test]
    fn weekly_single_object_is_wrapped() {
        let value = parse_payload(br#"{"spend":7}"#, PayloadKind::Weekly).unwrap();

        assert_eq!(value, json!([{"spend": 7}]));
    }

    #[test]
    fn weekly_array_is_not_nested() {
        let value = parse_payload(br#"[{"spend":7},{"spend":8}]"#, PayloadKind::Weekly).unwrap();

        assert_eq!(value, json!([{"spend": 7}, {"spend": 8}]));
    }

    #[test]
    fn malformed_json_is_invalid_payload() {
        let error = parse_payload(b"{not json", PayloadKind::Daily).unwrap_err();

        assert_eq!(error.code(), "E1004");
    }

    #[test]
    fn empty_body_is_invalid_payload() {
        assert!(matches!(
            parse_payload(b"", PayloadKind::Daily),
            Err(RelayError::InvalidPayload { .. })
        ));
    }
}
