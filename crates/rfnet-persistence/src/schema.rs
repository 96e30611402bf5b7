//! Embedded schema migrations.
//!
//! Each entry is applied once, in order, inside a transaction. The number of
//! applied migrations is kept in `PRAGMA user_version`.

use crate::error::{PersistenceError, PersistenceResult};
use rusqlite::Connection;
use tracing::info;

const MIGRATIONS: &[&str] = &[
    // 1: readings, sensors, latest_readings
    "CREATE TABLE readings (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        time      INTEGER NOT NULL,
        sensor_id INTEGER NOT NULL,
        seqno     INTEGER NOT NULL,
        type      INTEGER NOT NULL,
        value     REAL    NOT NULL
    );
    CREATE INDEX readings_time_idx ON readings(time);

    CREATE TABLE sensors (
        sensor_id INTEGER NOT NULL PRIMARY KEY,
        name      TEXT    NOT NULL,
        internal  INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE latest_readings (
        sensor_id       INTEGER NOT NULL PRIMARY KEY,
        last_reading_id INTEGER NOT NULL REFERENCES readings(id)
    );

    CREATE TRIGGER readings_track_latest AFTER INSERT ON readings
    BEGIN
        INSERT OR IGNORE INTO latest_readings (sensor_id, last_reading_id)
            VALUES (NEW.sensor_id, NEW.id);
        UPDATE latest_readings
            SET last_reading_id = NEW.id
            WHERE sensor_id = NEW.sensor_id
              AND last_reading_id <> NEW.id
              AND COALESCE(
                    (SELECT time FROM readings WHERE id = latest_readings.last_reading_id),
                    -1
                  ) <= NEW.time;
    END;",
];

/// Bring the schema up to date.
pub fn migrate(conn: &mut Connection) -> PersistenceResult<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let current = usize::try_from(current)
        .map_err(|_| PersistenceError::Migration(format!("invalid user_version {current}")))?;

    if current > MIGRATIONS.len() {
        return Err(PersistenceError::Migration(format!(
            "database schema version {current} is newer than supported {}",
            MIGRATIONS.len()
        )));
    }

    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = idx + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version as i64)?;
        tx.commit()?;
        info!(version, "Applied schema migration");
    }

    Ok(())
}

/// Number of migrations this build knows about.
pub fn latest_version() -> usize {
    MIGRATIONS.len()
}
