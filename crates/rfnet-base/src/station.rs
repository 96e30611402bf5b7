//! Base station loop.
//!
//! Strictly sequential: one device read, one decode, one relay, then the next
//! read. A slow uplink delays the next read; the uplink timeout bounds that.

use crate::error::BaseResult;
use rfnet_core::{CoreError, FrameDecoder};
use rfnet_telemetry::Metrics;
use rfnet_uplink::{RelayOutcome, Uplink};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationStats {
    /// Non-empty device reads.
    pub frames: u64,
    /// Frames that did not yield a reading.
    pub dropped: u64,
    pub delivered: u64,
    pub failed: u64,
    pub printed: u64,
    pub skipped: u64,
}

impl StationStats {
    fn record(&mut self, outcome: &RelayOutcome) {
        match outcome {
            RelayOutcome::Delivered => self.delivered += 1,
            RelayOutcome::Failed => self.failed += 1,
            RelayOutcome::Printed(_) => self.printed += 1,
            RelayOutcome::Skipped => self.skipped += 1,
        }
    }
}

pub struct BaseStation<R> {
    device: R,
    decoder: FrameDecoder,
    uplink: Uplink,
    buf: Vec<u8>,
    stats: StationStats,
}

impl<R> BaseStation<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(device: R, decoder: FrameDecoder, uplink: Uplink, read_buffer_len: usize) -> Self {
        Self {
            device,
            decoder,
            uplink,
            buf: vec![0; read_buffer_len],
            stats: StationStats::default(),
        }
    }

    pub fn stats(&self) -> StationStats {
        self.stats
    }

    /// Read and handle one frame.
    ///
    /// Returns `Ok(false)` at end of input. A read error is fatal.
    pub async fn step(&mut self) -> BaseResult<bool> {
        let n = self.device.read(&mut self.buf).await?;
        if n == 0 {
            return Ok(false);
        }
        self.stats.frames += 1;

        let decoded = match self.decoder.decode_frame(&self.buf[..n]) {
            Ok(decoded) => decoded,
            Err(e) => {
                Metrics::frame(match e {
                    CoreError::MalsizedFrame { .. } => "malsized",
                    _ => "float_rejected",
                });
                self.stats.dropped += 1;
                return Ok(true);
            }
        };
        Metrics::frame(if decoded.float_substituted {
            "float_substituted"
        } else {
            "accepted"
        });

        let reading = decoded.reading;
        debug!(sensor_id = reading.sensor_id, seqno = reading.seqno, rtype = reading.rtype, "Frame decoded");
        let outcome = self.uplink.relay(&reading).await;
        self.stats.record(&outcome);
        Ok(true)
    }

    /// Run until the device reports end of input.
    pub async fn run(mut self) -> BaseResult<StationStats> {
        while self.step().await? {}

        let decode = self.decoder.stats();
        info!(
            frames = self.stats.frames,
            dropped = self.stats.dropped,
            decode_incidents = decode.incidents(),
            "Device closed, stopping"
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BaseError;
    use rfnet_core::{FloatPolicy, FRAME_LEN};
    use std::io;
    use tokio_test::io::Builder;

    fn frame(sensor_id: u8, rtype: u16, value: f32, seqno: u16) -> Vec<u8> {
        let mut frame = Vec::with_capacity(FRAME_LEN);
        frame.extend_from_slice(&1_000_000_000u64.to_ne_bytes());
        frame.push(sensor_id);
        frame.extend_from_slice(&rtype.to_ne_bytes());
        frame.extend_from_slice(&value.to_le_bytes());
        frame.extend_from_slice(&seqno.to_ne_bytes());
        frame
    }

    fn station<R: AsyncRead + Unpin>(device: R, policy: FloatPolicy) -> BaseStation<R> {
        BaseStation::new(device, FrameDecoder::new(policy), Uplink::Console, 64)
    }

    #[tokio::test]
    async fn test_relays_each_frame_until_eof() {
        let device = Builder::new()
            .read(&frame(0, 1, 21.5, 1))
            .read(&frame(2, 2, 1013.25, 2))
            .build();

        let stats = station(device, FloatPolicy::ZeroSubstitute).run().await.unwrap();

        assert_eq!(stats.frames, 2);
        assert_eq!(stats.printed, 2);
        assert_eq!(stats.dropped, 0);
    }

    #[tokio::test]
    async fn test_malsized_frame_skipped_and_loop_continues() {
        let device = Builder::new()
            .read(&[0u8; 16])
            .read(&frame(1, 3, 3.3, 5))
            .build();

        let stats = station(device, FloatPolicy::ZeroSubstitute).run().await.unwrap();

        assert_eq!(stats.frames, 2);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.printed, 1);
    }

    #[tokio::test]
    async fn test_float_policy_applies() {
        let nan = frame(0, 1, f32::NAN, 9);

        let device = Builder::new().read(&nan).build();
        let stats = station(device, FloatPolicy::ZeroSubstitute).run().await.unwrap();
        assert_eq!((stats.printed, stats.dropped), (1, 0));

        let device = Builder::new().read(&nan).build();
        let stats = station(device, FloatPolicy::Reject).run().await.unwrap();
        assert_eq!((stats.printed, stats.dropped), (0, 1));
    }

    #[tokio::test]
    async fn test_unknown_sensor_skipped_on_console() {
        let device = Builder::new().read(&frame(7, 1, 1.0, 1)).build();

        let stats = station(device, FloatPolicy::ZeroSubstitute).run().await.unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.printed, 0);
    }

    #[tokio::test]
    async fn test_device_error_is_fatal() {
        let device = Builder::new()
            .read(&frame(0, 1, 1.0, 1))
            .read_error(io::Error::new(io::ErrorKind::Other, "radio gone"))
            .build();
        let mut station = station(device, FloatPolicy::ZeroSubstitute);

        assert!(station.step().await.unwrap());
        let err = station.step().await.unwrap_err();

        assert!(matches!(err, BaseError::Device(_)));
        assert_eq!(station.stats().printed, 1);
    }

    #[tokio::test]
    async fn test_empty_device_stops_cleanly() {
        let device = Builder::new().build();
        let stats = station(device, FloatPolicy::ZeroSubstitute).run().await.unwrap();
        assert_eq!(stats, StationStats::default());
    }
}
