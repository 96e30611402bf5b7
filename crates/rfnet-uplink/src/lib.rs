//! Uplink from the base station to the collector.
//!
//! Delivery is at-most-once: a reading is POSTed once, failures are logged and
//! dropped. Without an endpoint, readings are rendered to stdout instead.

pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod uplink;

pub use config::UplinkConfig;
pub use console::{render_line, render_line_in};
pub use error::{UplinkError, UplinkResult};
pub use http::{HttpUplink, READINGS_PATH};
pub use uplink::{RelayOutcome, Uplink};
