//! Uplink dispatch: remote collector or local console.

use crate::config::UplinkConfig;
use crate::console::render_line;
use crate::error::{UplinkError, UplinkResult};
use crate::http::HttpUplink;
use rfnet_core::Reading;
use rfnet_telemetry::Metrics;
use tracing::{info, warn};

/// What happened to one relayed reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Collector accepted the reading.
    Delivered,
    /// Transport error or non-success status. The reading is dropped.
    Failed,
    /// Rendered to stdout.
    Printed(String),
    /// Could not be rendered (unknown sensor or type). Nothing printed.
    Skipped,
}

/// Where decoded readings go.
pub enum Uplink {
    Remote(HttpUplink),
    Console,
}

impl Uplink {
    pub fn from_config(config: &UplinkConfig) -> UplinkResult<Self> {
        match config.endpoint() {
            Some(endpoint) => {
                let http = HttpUplink::new(endpoint, config.timeout())?;
                info!(url = %http.url(), timeout_ms = config.timeout_ms, "Uplink to collector");
                Ok(Self::Remote(http))
            }
            None => {
                info!("No endpoint configured, printing readings locally");
                Ok(Self::Console)
            }
        }
    }

    /// Relay one reading. Never fails: errors are logged, counted and dropped.
    pub async fn relay(&self, reading: &Reading) -> RelayOutcome {
        match self {
            Self::Remote(http) => match http.send(reading).await {
                Ok(()) => {
                    Metrics::uplink("delivered");
                    RelayOutcome::Delivered
                }
                Err(e) => {
                    let outcome = match e {
                        UplinkError::Status(_) => "http_error",
                        _ => "transport_error",
                    };
                    Metrics::uplink(outcome);
                    warn!(
                        error = %e,
                        sensor_id = reading.sensor_id,
                        seqno = reading.seqno,
                        "Uplink failed, reading dropped"
                    );
                    RelayOutcome::Failed
                }
            },
            Self::Console => match render_line(reading) {
                Ok(line) => {
                    println!("{line}");
                    Metrics::uplink("printed");
                    RelayOutcome::Printed(line)
                }
                Err(e) => {
                    Metrics::uplink("skipped");
                    warn!(error = %e, sensor_id = reading.sensor_id, rtype = reading.rtype, "Skipping unprintable reading");
                    RelayOutcome::Skipped
                }
            },
        }
    }
}
