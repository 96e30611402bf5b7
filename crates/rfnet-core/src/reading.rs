//! Reading and sensor types.
//!
//! A `Reading` is both the decoded form of a radio frame and the JSON body
//! exchanged between the base station and the collector. The raw integer ids
//! it carries are only interpreted through the checked mappings below.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of receive pipes on the radio, and therefore of addressable sensors.
pub const SENSOR_SLOTS: u8 = 6;

/// One sensor observation.
///
/// Field order is the wire order: `time, sensor_id, seqno, rtype, value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Receipt timestamp in nanoseconds since the Unix epoch.
    /// Captured by the receiving node, not the sensor.
    pub time: u64,
    /// Originating pipe id (0-5 for real sensors).
    pub sensor_id: u8,
    /// Wrapping sequence counter. Never validated.
    pub seqno: u16,
    /// Raw reading-type code, see [`ReadingType`].
    pub rtype: u16,
    pub value: f32,
}

impl Reading {
    /// Serialize to the canonical wire JSON.
    pub fn to_wire_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a wire JSON body.
    pub fn from_wire_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// Checked reading kind.
    pub fn reading_type(&self) -> Result<ReadingType> {
        ReadingType::try_from(self.rtype)
    }

    /// Checked sensor slot.
    pub fn slot(&self) -> Result<SensorSlot> {
        SensorSlot::try_from(self.sensor_id)
    }
}

/// Reading kind reported by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ReadingType {
    /// Reserved kind carried by frames with no measurement.
    #[serde(rename = "NULL")]
    Null = 0,
    #[serde(rename = "temperature")]
    Temperature = 1,
    #[serde(rename = "pressure")]
    Pressure = 2,
    #[serde(rename = "voltage")]
    Voltage = 3,
}

impl ReadingType {
    /// Raw code as carried on the wire.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Fixed-width label used by the console output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Null => "T_NULL",
            Self::Temperature => "T_TEMPERATURE",
            Self::Pressure => "T_PRESSURE",
            Self::Voltage => "T_VOLTAGE",
        }
    }
}

impl TryFrom<u16> for ReadingType {
    type Error = CoreError;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            0 => Ok(Self::Null),
            1 => Ok(Self::Temperature),
            2 => Ok(Self::Pressure),
            3 => Ok(Self::Voltage),
            other => Err(CoreError::UnknownReadingType(other)),
        }
    }
}

impl fmt::Display for ReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Temperature => write!(f, "temperature"),
            Self::Pressure => write!(f, "pressure"),
            Self::Voltage => write!(f, "voltage"),
        }
    }
}

/// Radio pipe slot a sensor transmits on, validated to `0..SENSOR_SLOTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorSlot(u8);

impl SensorSlot {
    pub fn index(&self) -> u8 {
        self.0
    }

    /// Default display name ("Sensor 1" for pipe 0, and so on).
    pub fn display_name(&self) -> String {
        format!("Sensor {}", self.0 + 1)
    }
}

impl TryFrom<u8> for SensorSlot {
    type Error = CoreError;

    fn try_from(id: u8) -> Result<Self> {
        if id < SENSOR_SLOTS {
            Ok(Self(id))
        } else {
            Err(CoreError::UnknownSensor(id))
        }
    }
}

impl fmt::Display for SensorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe_{}", self.0)
    }
}

/// Sensor directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    pub sensor_id: u8,
    /// Display label.
    pub name: String,
    /// Infrastructure sensor (not shown to end users).
    pub internal: bool,
}

/// A persisted reading with its store-assigned id.
///
/// Serializes as the bare reading; the id is not part of the query contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoredReading {
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(flatten)]
    pub reading: Reading,
}
