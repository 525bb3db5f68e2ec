//! Storage layer for the work-time tracker.
//!
//! Persists finished work intervals using `rusqlite`. The break rules never
//! see this crate; callers load intervals here and hand them to `wt-core`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! One table, `times`, with an integer row ID, the start and optional end of
//! the interval, and a remote flag.
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2025-01-29T08:00:00.000Z`), so lexicographic ordering matches
//! chronological ordering and range queries can compare strings.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use thiserror::Error;
use wt_core::WorkInterval;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for interval {id}: {timestamp}")]
    TimestampParse {
        id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A stored work interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalRecord {
    pub id: i64,
    pub interval: WorkInterval,
}

/// Raw row as read from SQLite, before timestamp parsing.
struct IntervalRow {
    id: i64,
    start: String,
    end: Option<String>,
    is_remote: bool,
}

impl IntervalRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start: row.get(1)?,
            end: row.get(2)?,
            is_remote: row.get(3)?,
        })
    }

    fn into_record(self) -> Result<IntervalRecord, DbError> {
        let start = parse_timestamp(&self.start, self.id)?;
        let end = self
            .end
            .as_deref()
            .map(|end| parse_timestamp(end, self.id))
            .transpose()?;
        Ok(IntervalRecord {
            id: self.id,
            interval: WorkInterval {
                start,
                end,
                is_remote: self.is_remote,
            },
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- start_at/end_at: RFC 3339 UTC (e.g., '2025-01-29T08:00:00.000Z'), end_at NULL while open
            CREATE TABLE IF NOT EXISTS times (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_at TEXT NOT NULL,
                end_at TEXT,
                remote INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_times_start ON times(start_at);
            ",
        )?;
        Ok(())
    }

    /// Inserts an interval and returns its ID.
    pub fn insert_interval(&self, interval: &WorkInterval) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO times (start_at, end_at, remote) VALUES (?, ?, ?)",
            params![
                format_timestamp(interval.start),
                interval.end.map(format_timestamp),
                interval.is_remote,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "inserted interval");
        Ok(id)
    }

    /// Replaces a stored interval. Returns `false` if the ID does not exist.
    pub fn update_interval(&self, id: i64, interval: &WorkInterval) -> Result<bool, DbError> {
        let rows = self.conn.execute(
            "UPDATE times SET start_at = ?, end_at = ?, remote = ? WHERE id = ?",
            params![
                format_timestamp(interval.start),
                interval.end.map(format_timestamp),
                interval.is_remote,
                id,
            ],
        )?;
        tracing::debug!(id, rows, "updated interval");
        Ok(rows == 1)
    }

    /// Deletes an interval. Returns `false` if the ID does not exist.
    pub fn delete_interval(&self, id: i64) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM times WHERE id = ?", params![id])?;
        tracing::debug!(id, rows, "deleted interval");
        Ok(rows == 1)
    }

    /// Fetches a single interval by ID.
    pub fn get_interval(&self, id: i64) -> Result<Option<IntervalRecord>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, start_at, end_at, remote FROM times WHERE id = ?",
                params![id],
                IntervalRow::from_row,
            )
            .optional()?;
        row.map(IntervalRow::into_record).transpose()
    }

    /// Lists all intervals, newest first.
    pub fn list_intervals(&self) -> Result<Vec<IntervalRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_at, end_at, remote
            FROM times
            ORDER BY start_at DESC, id DESC
            ",
        )?;
        let rows = stmt.query_map([], IntervalRow::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    /// Lists intervals whose start lies within a time range, oldest first.
    ///
    /// The range is inclusive of both `start` and `end`.
    pub fn list_intervals_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IntervalRecord>, DbError> {
        if end < start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_at, end_at, remote
            FROM times
            WHERE start_at BETWEEN ? AND ?
            ORDER BY start_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(
            [format_timestamp(start), format_timestamp(end)],
            IntervalRow::from_row,
        )?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    /// Writes a consistent copy of the database to `path`.
    ///
    /// Fails if `path` already exists and is not empty.
    pub fn export_to(&self, path: &Path) -> Result<i64, DbError> {
        self.conn
            .execute("VACUUM INTO ?", params![path.to_string_lossy()])?;
        let count = self.count_intervals()?;
        tracing::debug!(path = %path.display(), count, "exported database");
        Ok(count)
    }

    /// Replaces all stored intervals with those of the database at `path`.
    ///
    /// The source is opened read-only and fully read (timestamps included)
    /// before anything is changed, so a bad backup leaves the store as it was.
    /// IDs are preserved. Returns the number of imported intervals.
    pub fn import_from(&mut self, path: &Path) -> Result<usize, DbError> {
        let source = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let records = read_all_records(&source)?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM times", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO times (id, start_at, end_at, remote) VALUES (?, ?, ?, ?)",
            )?;
            for record in &records {
                let interval = &record.interval;
                insert.execute(params![
                    record.id,
                    format_timestamp(interval.start),
                    interval.end.map(format_timestamp),
                    interval.is_remote,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(path = %path.display(), count = records.len(), "imported database");
        Ok(records.len())
    }

    /// Number of stored intervals.
    pub fn count_intervals(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM times", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// All intervals of a `times` table, oldest first.
fn read_all_records(conn: &Connection) -> Result<Vec<IntervalRecord>, DbError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, start_at, end_at, remote
        FROM times
        ORDER BY start_at ASC, id ASC
        ",
    )?;
    let rows = stmt.query_map([], IntervalRow::from_row)?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

fn parse_timestamp(timestamp: &str, id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
