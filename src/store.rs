//! Sample Store - SQLite-backed persistent log of battery samples
//!
//! Owns the `samples` table: schema migrations, appends from the sampling
//! loop, and the day-bucketed reads behind the HTTP API. Timestamps are
//! stored as Unix seconds; day bucketing happens in SQL via
//! `DATE(timestamp, 'unixepoch', 'localtime')` so a "day" always means the
//! host-local calendar day.
//!
//! SQLite's own locking covers the concurrency model here: one writer
//! process (the sampling loop) plus any number of reader processes.

use crate::battery::{Sample, Status};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Schema migrations, applied in order and tracked via `PRAGMA user_version`.
const MIGRATIONS: &[&str] = &["
    CREATE TABLE IF NOT EXISTS samples (
        timestamp INTEGER NOT NULL,
        percent REAL NOT NULL,
        status TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_samples_timestamp ON samples(timestamp);
"];

/// Errors that can occur in the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored row cannot be interpreted as a sample
    #[error("corrupt row: {0}")]
    Corrupted(String),

    /// Lock acquisition failed
    #[error("lock error: {0}")]
    Lock(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One page of distinct sample days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPage {
    /// Total number of distinct days in the store
    pub total_items: usize,
    /// Total pages at the requested page size
    pub total_pages: usize,
    /// Days on this page, most recent first
    pub days: Vec<NaiveDate>,
}

/// SQLite-backed store for battery samples.
///
/// The connection sits behind a mutex so one store can be shared across
/// concurrent HTTP handlers.
pub struct SampleStore {
    conn: Mutex<Connection>,
}

impl SampleStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Bring the schema up to date.
    ///
    /// Idempotent: applied migrations are tracked in `user_version`, and
    /// re-running is a no-op. Never drops or alters existing data.
    pub fn migrate(&self) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let version: usize =
            conn.query_row("SELECT user_version FROM pragma_user_version", [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })?;

        if version >= MIGRATIONS.len() {
            return Ok(());
        }

        let tx = conn.transaction()?;
        for (i, migration) in MIGRATIONS.iter().enumerate().skip(version) {
            tx.execute_batch(migration)?;
            tx.pragma_update(None, "user_version", i as i64 + 1)?;
        }
        tx.commit()?;

        tracing::info!(
            from = version,
            to = MIGRATIONS.len(),
            "database migrations applied"
        );
        Ok(())
    }

    /// Append one sample. Duplicate timestamps are permitted.
    pub fn insert(&self, sample: &Sample) -> StoreResult<()> {
        self.conn()?.execute(
            "INSERT INTO samples (timestamp, percent, status) VALUES (?1, ?2, ?3)",
            params![
                sample.timestamp.timestamp(),
                sample.percent as f64,
                sample.status.as_str()
            ],
        )?;
        Ok(())
    }

    /// All samples whose host-local calendar day is `day`, ascending by
    /// timestamp. A day with no samples yields an empty vec.
    pub fn samples_for_day(&self, day: NaiveDate) -> StoreResult<Vec<Sample>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT timestamp, percent, status FROM samples
             WHERE DATE(timestamp, 'unixepoch', 'localtime') = ?1
             ORDER BY timestamp",
        )?;

        let rows = stmt.query_map(params![day.format("%Y-%m-%d").to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut samples = Vec::new();
        for row in rows {
            let (secs, percent, status) = row?;
            samples.push(Sample {
                timestamp: decode_timestamp(secs)?,
                percent: percent as f32,
                status: Status::from_str(&status)
                    .map_err(|e| StoreError::Corrupted(e.to_string()))?,
            });
        }
        Ok(samples)
    }

    /// Page through the distinct host-local days that have samples, most
    /// recent day first. `size` must be > 0; `offset` is in days.
    pub fn list_days(&self, size: usize, offset: usize) -> StoreResult<DayPage> {
        let conn = self.conn()?;

        let total_items: usize = conn.query_row(
            "SELECT COUNT(*) FROM (
                SELECT DATE(timestamp, 'unixepoch', 'localtime') AS day
                FROM samples
                GROUP BY day
            )",
            [],
            |row| row.get::<_, i64>(0).map(|n| n as usize),
        )?;

        let total_pages = total_items.div_ceil(size);

        let mut stmt = conn.prepare_cached(
            "SELECT DATE(timestamp, 'unixepoch', 'localtime') AS day
             FROM samples
             GROUP BY day
             ORDER BY day DESC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![size as i64, offset as i64], |row| {
            row.get::<_, String>(0)
        })?;

        let mut days = Vec::new();
        for row in rows {
            let day = row?;
            days.push(
                NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| StoreError::Corrupted(format!("bad day {:?}: {}", day, e)))?,
            );
        }

        Ok(DayPage {
            total_items,
            total_pages,
            days,
        })
    }
}

fn decode_timestamp(secs: i64) -> StoreResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| StoreError::Corrupted(format!("bad timestamp {}", secs)))
}
