//! Base station configuration.

use crate::error::{BaseError, BaseResult};
use rfnet_core::{FloatPolicy, FRAME_LEN};
use rfnet_uplink::UplinkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RFNET_BASE_CONFIG";

/// Config file used when neither a flag nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/base.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Radio character device.
    #[serde(default)]
    pub device: String,
    /// Collector base URL. Unset prints readings locally.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub float_policy: FloatPolicy,
    #[serde(default = "default_uplink_timeout_ms")]
    pub uplink_timeout_ms: u64,
    /// Bytes requested per device read. One read yields at most one frame.
    #[serde(default = "default_read_buffer_len")]
    pub read_buffer_len: usize,
}

fn default_uplink_timeout_ms() -> u64 {
    5_000
}

fn default_read_buffer_len() -> usize {
    64
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            endpoint: None,
            float_policy: FloatPolicy::default(),
            uplink_timeout_ms: default_uplink_timeout_ms(),
            read_buffer_len: default_read_buffer_len(),
        }
    }
}

impl BaseConfig {
    pub fn from_file(path: impl AsRef<Path>) -> BaseResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BaseError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> BaseResult<Self> {
        toml::from_str(content).map_err(|e| BaseError::Config(format!("Failed to parse config: {e}")))
    }

    /// Resolve configuration: explicit path > `RFNET_BASE_CONFIG` > default file.
    pub fn resolve(explicit: Option<String>) -> BaseResult<Self> {
        match explicit.or_else(|| std::env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of the file.
    pub fn with_overrides(mut self, device: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(device) = device {
            self.device = device;
        }
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        self
    }

    pub fn validate(&self) -> BaseResult<()> {
        if self.device.trim().is_empty() {
            return Err(BaseError::Config("device must be set".to_string()));
        }
        if self.read_buffer_len < FRAME_LEN {
            return Err(BaseError::Config(format!(
                "read_buffer_len must be at least {FRAME_LEN}, got {}",
                self.read_buffer_len
            )));
        }
        Ok(())
    }

    pub fn uplink(&self) -> UplinkConfig {
        UplinkConfig {
            endpoint: self.endpoint.clone(),
            timeout_ms: self.uplink_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BaseConfig::from_toml("device = \"/dev/rfm70\"").unwrap();
        assert_eq!(config.float_policy, FloatPolicy::ZeroSubstitute);
        assert_eq!(config.uplink_timeout_ms, 5_000);
        assert_eq!(config.read_buffer_len, 64);
        assert!(config.endpoint.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reject_policy_and_endpoint() {
        let config = BaseConfig::from_toml(
            r#"
            device = "/dev/rfm70"
            endpoint = "http://collector:8080"
            float_policy = "reject"
            uplink_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.float_policy, FloatPolicy::Reject);

        let uplink = config.uplink();
        assert_eq!(uplink.endpoint(), Some("http://collector:8080"));
        assert_eq!(uplink.timeout_ms, 250);
    }

    #[test]
    fn test_missing_device_is_invalid() {
        let config = BaseConfig::from_toml("").unwrap();
        assert!(matches!(config.validate(), Err(BaseError::Config(_))));
    }

    #[test]
    fn test_short_read_buffer_is_invalid() {
        let config = BaseConfig::from_toml("device = \"/dev/rfm70\"\nread_buffer_len = 16").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = BaseConfig::from_toml("device = \"/dev/a\"\nendpoint = \"http://x\"")
            .unwrap()
            .with_overrides(Some("/dev/b".to_string()), None);
        assert_eq!(config.device, "/dev/b");
        assert_eq!(config.endpoint.as_deref(), Some("http://x"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device = \"/dev/rfm70\"").unwrap();
        let config = BaseConfig::from_file(file.path()).unwrap();
        assert_eq!(config.device, "/dev/rfm70");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = BaseConfig::resolve(Some("/nonexistent/base.toml".to_string()));
        assert!(matches!(result, Err(BaseError::Config(_))));
    }
}
