//! Prometheus metrics for rfnet.
//!
//! Covers both processes:
//! - Base station: frame decode outcomes, uplink outcomes
//! - Collector: ingest outcomes, live subscribers, fan-out
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error caught at first use.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_int_gauge, CounterVec, Encoder, Histogram,
    IntGauge, TextEncoder,
};

/// Frames read from the radio device.
/// Labels: outcome (accepted/malsized/float_substituted/float_rejected)
pub static FRAMES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfnet_frames_total",
        "Radio frames processed by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Uplink attempts.
/// Labels: outcome (delivered/http_error/transport_error/printed/skipped)
pub static UPLINK_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfnet_uplink_total",
        "Readings relayed by the uplink by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Ingest requests.
/// Labels: outcome (persisted/bad_request/store_error)
pub static INGEST_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfnet_ingest_total",
        "Readings received by the collector by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Currently registered real-time subscribers.
pub static SUBSCRIBERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("rfnet_subscribers", "Live real-time subscribers").unwrap()
});

/// Subscribers dropped during broadcast.
/// Labels: reason (full/closed)
pub static SUBSCRIBERS_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfnet_subscribers_dropped_total",
        "Subscribers removed because a broadcast could not be queued",
        &["reason"]
    )
    .unwrap()
});

/// Subscribers reached per broadcast.
pub static BROADCAST_FANOUT: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "rfnet_broadcast_fanout",
        "Subscribers that accepted each broadcast",
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 250.0]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a decoded (or rejected) frame.
    pub fn frame(outcome: &str) {
        FRAMES_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record an uplink outcome.
    pub fn uplink(outcome: &str) {
        UPLINK_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record an ingest outcome.
    pub fn ingest(outcome: &str) {
        INGEST_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Set the live subscriber count.
    pub fn subscribers_set(count: usize) {
        SUBSCRIBERS.set(count as i64);
    }

    /// Record a subscriber dropped mid-broadcast.
    pub fn subscriber_dropped(reason: &str) {
        SUBSCRIBERS_DROPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record how many subscribers accepted a broadcast.
    pub fn broadcast_fanout(delivered: usize) {
        BROADCAST_FANOUT.observe(delivered as f64);
    }

    /// Render the default registry in the text exposition format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
