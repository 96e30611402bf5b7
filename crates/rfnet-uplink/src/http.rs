//! HTTP delivery to the collector.

use crate::error::{UplinkError, UplinkResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use rfnet_core::Reading;
use std::time::Duration;
use tracing::debug;

/// Ingest path on the collector.
pub const READINGS_PATH: &str = "/api/v1/readings";

/// Posts readings to `<endpoint>/api/v1/readings`.
pub struct HttpUplink {
    client: Client,
    url: String,
}

impl HttpUplink {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> UplinkResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UplinkError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}{}", endpoint.trim_end_matches('/'), READINGS_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a single POST. No retry.
    pub async fn send(&self, reading: &Reading) -> UplinkResult<()> {
        let body = reading.to_wire_json()?;

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UplinkError::Status(status));
        }

        debug!(sensor_id = reading.sensor_id, seqno = reading.seqno, "Reading delivered");
        Ok(())
    }
}
