//! SQLite-backed `ReadingStore`.

use crate::error::{PersistenceError, PersistenceResult};
use crate::schema;
use crate::store::{ReadingStore, TimeRange};
use parking_lot::Mutex;
use rfnet_core::{Reading, Sensor, StoredReading};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tracing::{debug, info};

const SELECT_RANGE: &str = "SELECT id, time, sensor_id, seqno, type, value FROM readings
     WHERE (?1 IS NULL OR time >= ?1) AND (?2 IS NULL OR time < ?2)
     ORDER BY time ASC, id ASC";

const SELECT_LATEST: &str = "SELECT r.id, r.time, r.sensor_id, r.seqno, r.type, r.value
     FROM latest_readings l INNER JOIN readings r ON l.last_reading_id = r.id
     ORDER BY r.sensor_id ASC";

/// SQLite reading store. One connection, serialized by a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening reading store");
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> PersistenceResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> PersistenceResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn to_sql_time(time: u64) -> PersistenceResult<i64> {
    i64::try_from(time).map_err(|_| PersistenceError::TimestampOutOfRange(time))
}

fn map_reading(row: &Row<'_>) -> rusqlite::Result<StoredReading> {
    let raw_time: i64 = row.get(1)?;
    let time = u64::try_from(raw_time)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, raw_time))?;
    let value: f64 = row.get(5)?;
    Ok(StoredReading {
        id: row.get(0)?,
        reading: Reading {
            time,
            sensor_id: row.get(2)?,
            seqno: row.get(3)?,
            rtype: row.get(4)?,
            value: value as f32,
        },
    })
}

impl ReadingStore for SqliteStore {
    fn insert_reading(&self, reading: &Reading) -> PersistenceResult<i64> {
        let time = to_sql_time(reading.time)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO readings (time, sensor_id, seqno, type, value) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                time,
                reading.sensor_id,
                reading.seqno,
                reading.rtype,
                f64::from(reading.value)
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, sensor_id = reading.sensor_id, seqno = reading.seqno, "Reading persisted");
        Ok(id)
    }

    fn readings_in_range(&self, range: TimeRange) -> PersistenceResult<Vec<StoredReading>> {
        // Stored times never exceed i64::MAX.
        let start = match range.start.map(i64::try_from).transpose() {
            Ok(start) => start,
            Err(_) => return Ok(Vec::new()),
        };
        let end = range.end.and_then(|e| i64::try_from(e).ok());

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(SELECT_RANGE)?;
        let rows = stmt
            .query_map(params![start, end], map_reading)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn latest_per_sensor(&self) -> PersistenceResult<Vec<StoredReading>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(SELECT_LATEST)?;
        let rows = stmt
            .query_map([], map_reading)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn sensors(&self) -> PersistenceResult<Vec<Sensor>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT sensor_id, name, internal FROM sensors ORDER BY sensor_id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Sensor {
                    sensor_id: row.get(0)?,
                    name: row.get(1)?,
                    internal: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn upsert_sensor(&self, sensor: &Sensor) -> PersistenceResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sensors (sensor_id, name, internal) VALUES (?1, ?2, ?3)
             ON CONFLICT(sensor_id) DO UPDATE SET name = excluded.name, internal = excluded.internal",
            params![sensor.sensor_id, sensor.name, sensor.internal],
        )?;
        debug!(sensor_id = sensor.sensor_id, name = %sensor.name, "Sensor upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reading(time: u64, sensor_id: u8, seqno: u16) -> Reading {
        Reading {
            time,
            sensor_id,
            seqno,
            rtype: 1,
            value: 20.0 + seqno as f32,
        }
    }

    fn times(rows: &[StoredReading]) -> Vec<u64> {
        rows.iter().map(|r| r.reading.time).collect()
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = store.insert_reading(&reading(1, 0, 0)).unwrap();
        let b = store.insert_reading(&reading(2, 0, 1)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_range_query_half_open_and_sorted() {
        let store = SqliteStore::open_in_memory().unwrap();
        // Inserted out of order on purpose.
        for (i, t) in [250u64, 100, 199, 50, 200, 150].iter().enumerate() {
            store.insert_reading(&reading(*t, 1, i as u16)).unwrap();
        }

        let rows = store
            .readings_in_range(TimeRange::new(Some(100), Some(200)))
            .unwrap();

        assert_eq!(times(&rows), vec![100, 150, 199]);
    }

    #[test]
    fn test_range_query_open_bounds() {
        let store = SqliteStore::open_in_memory().unwrap();
        for t in [30u64, 10, 20] {
            store.insert_reading(&reading(t, 0, 0)).unwrap();
        }

        let all = store.readings_in_range(TimeRange::default()).unwrap();
        assert_eq!(times(&all), vec![10, 20, 30]);

        let from = store.readings_in_range(TimeRange::new(Some(20), None)).unwrap();
        assert_eq!(times(&from), vec![20, 30]);

        let until = store.readings_in_range(TimeRange::new(None, Some(20))).unwrap();
        assert_eq!(times(&until), vec![10]);

        let beyond = store
            .readings_in_range(TimeRange::new(Some(u64::MAX), None))
            .unwrap();
        assert!(beyond.is_empty());

        let unbounded_end = store
            .readings_in_range(TimeRange::new(None, Some(u64::MAX)))
            .unwrap();
        assert_eq!(unbounded_end.len(), 3);
    }

    #[test]
    fn test_reading_fields_survive_storage() {
        let store = SqliteStore::open_in_memory().unwrap();
        let original = Reading {
            time: 1_700_000_000_123_456_789,
            sensor_id: 5,
            seqno: u16::MAX,
            rtype: 3,
            value: 3.3,
        };
        let id = store.insert_reading(&original).unwrap();

        let rows = store.readings_in_range(TimeRange::default()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].reading, original);
    }

    #[test]
    fn test_timestamp_beyond_i64_refused() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.insert_reading(&reading(u64::MAX, 0, 0)).unwrap_err();
        assert!(matches!(err, PersistenceError::TimestampOutOfRange(u64::MAX)));
    }

    #[test]
    fn test_latest_per_sensor() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_reading(&reading(10, 1, 0)).unwrap();
        store.insert_reading(&reading(30, 1, 1)).unwrap();
        // Late arrival with an older timestamp must not replace the latest.
        store.insert_reading(&reading(20, 1, 2)).unwrap();
        store.insert_reading(&reading(15, 2, 3)).unwrap();
        store.insert_reading(&reading(25, 2, 4)).unwrap();

        let latest = store.latest_per_sensor().unwrap();

        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].reading.sensor_id, 1);
        assert_eq!(latest[0].reading.time, 30);
        assert_eq!(latest[0].reading.seqno, 1);
        assert_eq!(latest[1].reading.sensor_id, 2);
        assert_eq!(latest[1].reading.time, 25);
    }

    #[test]
    fn test_latest_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.latest_per_sensor().unwrap().is_empty());
    }

    #[test]
    fn test_sensor_upsert_replaces() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .upsert_sensor(&Sensor {
                sensor_id: 3,
                name: "A".to_string(),
                internal: false,
            })
            .unwrap();
        store
            .upsert_sensor(&Sensor {
                sensor_id: 3,
                name: "B".to_string(),
                internal: true,
            })
            .unwrap();
        store
            .upsert_sensor(&Sensor {
                sensor_id: 1,
                name: "Garage".to_string(),
                internal: false,
            })
            .unwrap();

        let sensors = store.sensors().unwrap();

        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[0].sensor_id, 1);
        assert_eq!(
            sensors[1],
            Sensor {
                sensor_id: 3,
                name: "B".to_string(),
                internal: true,
            }
        );
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rfnet.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_reading(&reading(10, 0, 0)).unwrap();
            store.insert_reading(&reading(20, 0, 1)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        store.insert_reading(&reading(30, 0, 2)).unwrap();

        let rows = store.readings_in_range(TimeRange::default()).unwrap();
        assert_eq!(times(&rows), vec![10, 20, 30]);
        assert_eq!(store.latest_per_sensor().unwrap()[0].reading.time, 30);
    }
}
