//! Prometheus metrics and structured logging for rfnet.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for frame decoding, uplink, ingest and fan-out

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
