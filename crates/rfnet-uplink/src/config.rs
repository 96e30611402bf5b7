//! Uplink configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Uplink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UplinkConfig {
    /// Collector base URL (e.g. "http://collector:8080"). None = print locally.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Upper bound for one POST, so a stalled collector cannot block frame intake.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl UplinkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configured endpoint, ignoring blank values.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}
