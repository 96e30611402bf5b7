//! Durable store for rfnet readings and the sensor directory.
//!
//! Readings are append-only. A trigger-maintained `latest_readings` relation
//! tracks the most recent reading per sensor; this crate only reads it.

pub mod error;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::SqliteStore;
pub use store::{ReadingStore, TimeRange};
