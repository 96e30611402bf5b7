//! Uplink error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Collector responded {0}")]
    Status(reqwest::StatusCode),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot render reading: {0}")]
    Render(#[from] rfnet_core::CoreError),

    #[error("Timestamp out of range: {0}")]
    Timestamp(u64),
}

pub type UplinkResult<T> = Result<T, UplinkError>;
