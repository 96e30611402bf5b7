//! Store abstraction used by the collector.

use crate::error::PersistenceResult;
use rfnet_core::{Reading, Sensor, StoredReading};

/// Half-open time window `[start, end)` in nanoseconds. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl TimeRange {
    pub fn new(start: Option<u64>, end: Option<u64>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: u64) -> bool {
        self.start.map_or(true, |s| time >= s) && self.end.map_or(true, |e| time < e)
    }
}

/// Durable reading and sensor storage.
///
/// Implementations are blocking; async callers should go through
/// `spawn_blocking`.
pub trait ReadingStore: Send + Sync {
    /// Append a reading and return its store-assigned id.
    fn insert_reading(&self, reading: &Reading) -> PersistenceResult<i64>;

    /// Readings with `start <= time < end`, ascending by time.
    fn readings_in_range(&self, range: TimeRange) -> PersistenceResult<Vec<StoredReading>>;

    /// The maximum-time reading of every sensor present in the store.
    fn latest_per_sensor(&self) -> PersistenceResult<Vec<StoredReading>>;

    /// All sensor directory entries.
    fn sensors(&self) -> PersistenceResult<Vec<Sensor>>;

    /// Insert a sensor, or replace `name`/`internal` of an existing one.
    fn upsert_sensor(&self, sensor: &Sensor) -> PersistenceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_half_open() {
        let range = TimeRange::new(Some(100), Some(200));
        assert!(!range.contains(99));
        assert!(range.contains(100));
        assert!(range.contains(199));
        assert!(!range.contains(200));
        assert!(TimeRange::default().contains(u64::MAX));
    }
}
