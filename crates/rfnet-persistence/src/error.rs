//! Persistence error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Timestamp out of storable range: {0}")]
    TimestampOutOfRange(u64),

    #[error("Migration failed: {0}")]
    Migration(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
