//! Collector configuration.

use crate::error::{CollectorError, CollectorResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RFNET_COLLECTOR_CONFIG";

/// Config file used when neither CLI nor environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/collector.toml";

/// Collector service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Address to bind.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Payloads buffered per subscriber before it is considered stalled.
    #[serde(default = "default_subscriber_queue_capacity")]
    pub subscriber_queue_capacity: usize,
    /// Maximum concurrent real-time subscribers.
    #[serde(default = "default_max_subscribers")]
    pub max_subscribers: usize,
    /// Per-message WebSocket send timeout in milliseconds.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "rfnet.db".to_string()
}

fn default_subscriber_queue_capacity() -> usize {
    64
}

fn default_max_subscribers() -> usize {
    256
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            db_path: default_db_path(),
            subscriber_queue_capacity: default_subscriber_queue_capacity(),
            max_subscribers: default_max_subscribers(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl CollectorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> CollectorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CollectorError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> CollectorResult<Self> {
        toml::from_str(content)
            .map_err(|e| CollectorError::Config(format!("Failed to parse config: {e}")))
    }

    /// Resolve configuration: explicit path > `RFNET_COLLECTOR_CONFIG` > default file.
    ///
    /// An explicitly named file must exist; a missing default file yields defaults.
    pub fn resolve(explicit: Option<String>) -> CollectorResult<Self> {
        match explicit.or_else(|| std::env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn socket_addr(&self) -> CollectorResult<SocketAddr> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|e| CollectorError::Config(format!("Invalid bind address: {e}")))
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}
