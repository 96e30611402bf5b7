//! Core domain types for the rfnet sensor telemetry pipeline.
//!
//! This crate provides the types shared by the base station and the collector:
//! - `Reading`: one decoded sensor observation, also the ingest wire form
//! - `ReadingType`, `SensorSlot`: checked mappings for the raw integer ids
//! - `Sensor`, `StoredReading`: collector-side records
//! - `FrameDecoder`: fixed 17-byte radio frame parser

pub mod error;
pub mod frame;
pub mod reading;

pub use error::{CoreError, Result};
pub use frame::{DecodeStats, Decoded, FloatPolicy, FrameDecoder, FRAME_LEN};
pub use reading::{Reading, ReadingType, Sensor, SensorSlot, StoredReading, SENSOR_SLOTS};
