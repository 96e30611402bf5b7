//! rfnet base station.
//!
//! Reads fixed-size radio frames from the receiver device, decodes them into
//! readings and relays each one to the collector (or prints it when no
//! collector is configured).
//!
//! ```text
//! device ──read──► FrameDecoder ──Reading──► Uplink ──POST──► collector
//!                                               └──────────► stdout
//! ```

pub mod config;
pub mod error;
pub mod runtime;
pub mod station;

pub use config::BaseConfig;
pub use error::{BaseError, BaseResult};
pub use runtime::{block_on_bounded, SHUTDOWN_GRACE};
pub use station::{BaseStation, StationStats};
