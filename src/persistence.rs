//! # SQLite Record Store
//!
//! [`RecordStore`] backed by a single SQLite table. Scalar fields get their
//! own columns so date and category queries run in SQL; the supplement list
//! is stored as a MessagePack blob.

use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, SessionError};
use crate::record::Supplement;
use crate::store::RecordStore;
use crate::{ActivityCategory, Record, SessionId};

const RECORD_COLUMNS: &str =
    "id, date, category, comment, duration_seconds, distance_meters, step_count, calorie_count, supplements";

fn db_error(e: rusqlite::Error) -> SessionError {
    SessionError::store(format!("database: {}", e))
}

/// Column values as read from SQLite, before domain parsing.
struct RawRecord {
    id: String,
    date: f64,
    category: String,
    comment: Option<String>,
    duration_seconds: f64,
    distance_meters: Option<f64>,
    step_count: Option<u32>,
    calorie_count: Option<u32>,
    supplements: Option<Vec<u8>>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            category: row.get(2)?,
            comment: row.get(3)?,
            duration_seconds: row.get(4)?,
            distance_meters: row.get(5)?,
            step_count: row.get(6)?,
            calorie_count: row.get(7)?,
            supplements: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<Record> {
        let supplements = match self.supplements {
            Some(blob) => Some(
                rmp_serde::from_slice::<Vec<Supplement>>(&blob)
                    .map_err(|e| SessionError::store(format!("corrupt supplements: {}", e)))?,
            ),
            None => None,
        };

        Ok(Record {
            id: self.id.parse()?,
            date: self.date,
            category: self
                .category
                .parse()
                .map_err(|e| SessionError::store(format!("corrupt category: {}", e)))?,
            comment: self.comment,
            duration_seconds: self.duration_seconds,
            distance_meters: self.distance_meters,
            step_count: self.step_count,
            calorie_count: self.calorie_count,
            supplements,
        })
    }
}

fn encode_supplements(supplements: &Option<Vec<Supplement>>) -> Result<Option<Vec<u8>>> {
    supplements
        .as_ref()
        .map(|s| {
            rmp_serde::to_vec(s)
                .map_err(|e| SessionError::store(format!("failed to encode supplements: {}", e)))
        })
        .transpose()
}

/// Finished workout records in SQLite.
pub struct SqliteRecordStore {
    db: Connection,
}

impl SqliteRecordStore {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Open (or create) the database at `db_path`.
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Connection::open(db_path).map_err(db_error)?;
        Self::init_schema(&db).map_err(db_error)?;
        info!("[SqliteRecordStore] Opened {}", db_path);
        Ok(Self { db })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                date REAL NOT NULL,
                category TEXT NOT NULL,
                comment TEXT,
                duration_seconds REAL NOT NULL,
                distance_meters REAL,
                step_count INTEGER,
                calorie_count INTEGER,
                supplements BLOB
            );

            CREATE INDEX IF NOT EXISTS idx_records_date ON records(date);
            CREATE INDEX IF NOT EXISTS idx_records_category ON records(category);
            "#,
        )
    }

    fn query(&self, filter: &str, args: impl rusqlite::Params) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM records {} ORDER BY date DESC, id ASC",
            RECORD_COLUMNS, filter
        );
        let mut stmt = self.db.prepare(&sql).map_err(db_error)?;
        let rows = stmt
            .query_map(args, RawRecord::from_row)
            .map_err(db_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;

        rows.into_iter().map(RawRecord::into_record).collect()
    }

    fn exists(&self, id: &SessionId) -> Result<bool> {
        self.db
            .query_row(
                "SELECT 1 FROM records WHERE id = ?",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(db_error)
    }
}

impl RecordStore for SqliteRecordStore {
    fn save(&mut self, record: &Record) -> Result<()> {
        if self.exists(&record.id)? {
            return Err(SessionError::store(format!(
                "record {} already exists",
                record.id
            )));
        }

        let supplements = encode_supplements(&record.supplements)?;
        self.db
            .execute(
                &format!(
                    "INSERT INTO records ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    RECORD_COLUMNS
                ),
                params![
                    record.id.to_string(),
                    record.date,
                    record.category.as_str(),
                    record.comment,
                    record.duration_seconds,
                    record.distance_meters,
                    record.step_count,
                    record.calorie_count,
                    supplements,
                ],
            )
            .map_err(db_error)?;

        debug!("[SqliteRecordStore] Saved record {}", record.id);
        Ok(())
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        let supplements = encode_supplements(&record.supplements)?;
        let changed = self
            .db
            .execute(
                "UPDATE records SET date = ?, category = ?, comment = ?, duration_seconds = ?,
                 distance_meters = ?, step_count = ?, calorie_count = ?, supplements = ?
                 WHERE id = ?",
                params![
                    record.date,
                    record.category.as_str(),
                    record.comment,
                    record.duration_seconds,
                    record.distance_meters,
                    record.step_count,
                    record.calorie_count,
                    supplements,
                    record.id.to_string(),
                ],
            )
            .map_err(db_error)?;

        if changed == 0 {
            return Err(SessionError::store(format!(
                "cannot update missing record {}",
                record.id
            )));
        }
        Ok(())
    }

    fn delete(&mut self, id: &SessionId) -> Result<()> {
        let changed = self
            .db
            .execute("DELETE FROM records WHERE id = ?", params![id.to_string()])
            .map_err(db_error)?;

        if changed == 0 {
            return Err(SessionError::store(format!(
                "cannot delete missing record {}",
                id
            )));
        }
        debug!("[SqliteRecordStore] Deleted record {}", id);
        Ok(())
    }

    fn get(&self, id: &SessionId) -> Result<Option<Record>> {
        Ok(self
            .query("WHERE id = ?", params![id.to_string()])?
            .into_iter()
            .next())
    }

    fn list(&self) -> Result<Vec<Record>> {
        self.query("", params![])
    }

    fn in_range(&self, start: f64, end: f64) -> Result<Vec<Record>> {
        self.query("WHERE date >= ? AND date <= ?", params![start, end])
    }

    fn by_category(&self, category: ActivityCategory) -> Result<Vec<Record>> {
        self.query("WHERE category = ?", params![category.as_str()])
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(db_error)?;
        Ok(count as usize)
    }
}
