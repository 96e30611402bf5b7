//! Base station error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open device {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The radio device failed mid-stream. Fatal: there is nothing left to read.
    #[error("Device read failed: {0}")]
    Device(#[from] std::io::Error),

    #[error("Uplink error: {0}")]
    Uplink(#[from] rfnet_uplink::UplinkError),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] rfnet_telemetry::TelemetryError),
}

pub type BaseResult<T> = Result<T, BaseError>;
