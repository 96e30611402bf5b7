//! Reading ingest: persist, then fan out to live subscribers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use rfnet_core::Reading;
use rfnet_telemetry::Metrics;
use std::sync::Arc;
use tracing::debug;

/// `POST /api/v1/readings`
///
/// The reading is persisted first; only a persisted reading is broadcast.
/// Subscribers receive the request body verbatim. Broadcast cannot change the
/// response: failing subscribers are dropped inside the registry.
pub async fn post_reading(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let (text, reading) = parse_body(&body).map_err(|e| {
        Metrics::ingest("bad_request");
        e
    })?;

    let id = state
        .with_store(move |store| store.insert_reading(&reading))
        .await
        .map_err(|e| {
            Metrics::ingest("store_error");
            e
        })?;
    Metrics::ingest("persisted");

    let report = state.registry().broadcast(Arc::from(text));
    debug!(
        id,
        sensor_id = reading.sensor_id,
        seqno = reading.seqno,
        delivered = report.delivered,
        dropped = report.dropped,
        "Reading ingested"
    );

    Ok(StatusCode::OK)
}

fn parse_body(body: &[u8]) -> Result<(&str, Reading), ApiError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ApiError::BadRequest(format!("body is not UTF-8: {e}")))?;
    let reading = Reading::from_wire_json(text).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    // Out-of-range numbers parse to infinity and cannot be stored or re-served as JSON.
    if !reading.value.is_finite() {
        return Err(ApiError::BadRequest(format!(
            "value out of range: {}",
            reading.value
        )));
    }
    Ok((text, reading))
}
