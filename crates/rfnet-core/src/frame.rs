//! Radio frame decoding.
//!
//! Layout of a 17-byte frame:
//!
//! ```text
//! offset  len  field
//!      0    8  receipt timestamp, u64 ns, host byte order
//!      8    1  pipe / sensor id
//!      9    2  reading type, u16, host byte order
//!     11    4  value, f32, little-endian
//!     15    2  sequence number, u16, host byte order
//! ```
//!
//! There is no CRC or authenticity check here; integrity belongs to the radio
//! link layer.

use crate::error::{CoreError, Result};
use crate::reading::Reading;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Exact length of a valid frame.
pub const FRAME_LEN: usize = 17;

const TIME: std::ops::Range<usize> = 0..8;
const PIPE: usize = 8;
const RTYPE: std::ops::Range<usize> = 9..11;
const VALUE: std::ops::Range<usize> = 11..15;
const SEQNO: std::ops::Range<usize> = 15..17;

/// What to do with a frame whose float field cannot be decoded.
///
/// The field is undecodable when its bytes cannot be taken from the frame or
/// decode to NaN/infinity, which the JSON wire form cannot carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatPolicy {
    /// Emit the reading with `value = 0.0`.
    #[default]
    ZeroSubstitute,
    /// Drop the frame.
    Reject,
}

/// Incident counters for the decoder.
#[derive(Debug, Default)]
pub struct DecodeStats {
    accepted: AtomicU64,
    malsized: AtomicU64,
    float_substituted: AtomicU64,
    float_rejected: AtomicU64,
}

impl DecodeStats {
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn malsized(&self) -> u64 {
        self.malsized.load(Ordering::Relaxed)
    }

    pub fn float_substituted(&self) -> u64 {
        self.float_substituted.load(Ordering::Relaxed)
    }

    pub fn float_rejected(&self) -> u64 {
        self.float_rejected.load(Ordering::Relaxed)
    }

    /// Total frames that did not decode cleanly.
    pub fn incidents(&self) -> u64 {
        self.malsized() + self.float_substituted() + self.float_rejected()
    }
}

/// Result of decoding one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub reading: Reading,
    /// The value field was replaced by `0.0`.
    pub float_substituted: bool,
}

/// Stateless frame parser with shared incident counters.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    policy: FloatPolicy,
    stats: Arc<DecodeStats>,
}

impl FrameDecoder {
    pub fn new(policy: FloatPolicy) -> Self {
        Self {
            policy,
            stats: Arc::new(DecodeStats::default()),
        }
    }

    pub fn policy(&self) -> FloatPolicy {
        self.policy
    }

    pub fn stats(&self) -> Arc<DecodeStats> {
        self.stats.clone()
    }

    /// Decode a frame into a `Reading`.
    pub fn decode(&self, frame: &[u8]) -> Result<Reading> {
        self.decode_frame(frame).map(|d| d.reading)
    }

    /// Decode a frame, reporting whether the float policy was applied.
    ///
    /// Never panics; every rejection is counted and logged.
    pub fn decode_frame(&self, frame: &[u8]) -> Result<Decoded> {
        if frame.len() != FRAME_LEN {
            self.stats.malsized.fetch_add(1, Ordering::Relaxed);
            warn!(len = frame.len(), "Skipping malsized frame");
            return Err(CoreError::MalsizedFrame {
                expected: FRAME_LEN,
                actual: frame.len(),
            });
        }

        let time = u64::from_ne_bytes(field(frame, TIME)?);
        let sensor_id = frame[PIPE];
        let rtype = u16::from_ne_bytes(field(frame, RTYPE)?);
        let seqno = u16::from_ne_bytes(field(frame, SEQNO)?);

        let (value, float_substituted) = match decode_value(frame) {
            Ok(value) => (value, false),
            Err(e) => match self.policy {
                FloatPolicy::ZeroSubstitute => {
                    self.stats.float_substituted.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, sensor_id, seqno, "Substituting 0.0 for undecodable value");
                    (0.0, true)
                }
                FloatPolicy::Reject => {
                    self.stats.float_rejected.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, sensor_id, seqno, "Rejecting frame with undecodable value");
                    return Err(e);
                }
            },
        };

        self.stats.accepted.fetch_add(1, Ordering::Relaxed);

        Ok(Decoded {
            reading: Reading {
                time,
                sensor_id,
                seqno,
                rtype,
                value,
            },
            float_substituted,
        })
    }
}

fn field<const N: usize>(frame: &[u8], range: std::ops::Range<usize>) -> Result<[u8; N]> {
    frame
        .get(range.clone())
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(CoreError::MalsizedFrame {
            expected: FRAME_LEN,
            actual: frame.len(),
        })
}

fn decode_value(frame: &[u8]) -> Result<f32> {
    let bytes: [u8; 4] = frame
        .get(VALUE)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| CoreError::UndecodableFloat("value field truncated".to_string()))?;
    let value = f32::from_le_bytes(bytes);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::UndecodableFloat(format!(
            "non-finite value {value} ({bytes:02x?})"
        )))
    }
}
