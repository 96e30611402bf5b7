//! Collector error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rfnet_persistence::PersistenceError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] rfnet_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CollectorResult<T> = Result<T, CollectorError>;

/// Handler error, rendered as a plain-text HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input from the caller.
    #[error("{0}")]
    BadRequest(String),

    /// The durable store failed.
    #[error("{0}")]
    Store(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(e: PersistenceError) -> Self {
        Self::Store(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
