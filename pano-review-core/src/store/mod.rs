//! SQLite-backed persistence for panoramas, detections, reviews, and assets.
//!
//! One [`Store`] owns one connection; domain operations are split across the
//! per-concern modules in this directory. All timestamps are stored as
//! RFC 3339 text in UTC, written explicitly at insert time so history
//! ordering is stable under `ORDER BY created_at, id`.

mod schema;

pub mod assets;
pub mod detections;
pub mod panoramas;
pub mod reviews;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;

use crate::error::CoreError;

pub use schema::{MIGRATIONS, SCHEMA};

pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Storage(rusqlite::Error::ToSqlConversionFailure(e.into())))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests and throwaway tooling runs.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn initialize(&self) -> Result<(), CoreError> {
        self.conn.execute_batch(SCHEMA)?;
        self.run_migrations()?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<(), CoreError> {
        for migration in MIGRATIONS {
            let _ = self.conn.execute(migration, []);
        }
        Ok(())
    }
}

/// RFC 3339 string for a new row's created_at column.
pub(crate) fn now_ts() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a stored timestamp inside a rusqlite row mapper.
pub(crate) fn ts_from_sql(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Same as [`ts_from_sql`] for nullable columns.
pub(crate) fn opt_ts_from_sql(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| ts_from_sql(idx, s)).transpose()
}
