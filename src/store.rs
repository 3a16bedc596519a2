//! Record store contract.
//!
//! The engine only produces [`Record`]s; keeping them is the job of a
//! [`RecordStore`]. Two implementations ship with the crate:
//! [`MemoryRecordStore`] here and
//! [`SqliteRecordStore`](crate::SqliteRecordStore) behind the `persistence`
//! feature.

use std::collections::HashMap;

use log::debug;

use crate::error::{OptionExt, Result, SessionError};
use crate::{ActivityCategory, Record, SessionId};

/// Keyed storage of finished workout records.
pub trait RecordStore {
    /// Insert a new record. Fails if a record with the same id exists.
    fn save(&mut self, record: &Record) -> Result<()>;

    /// Replace an existing record. Fails if no record has this id.
    fn update(&mut self, record: &Record) -> Result<()>;

    /// Remove a record. Fails if no record has this id.
    fn delete(&mut self, id: &SessionId) -> Result<()>;

    fn get(&self, id: &SessionId) -> Result<Option<Record>>;

    /// All records, newest first.
    fn list(&self) -> Result<Vec<Record>>;

    /// Records whose date falls within `[start, end]` (Unix seconds), newest first.
    fn in_range(&self, start: f64, end: f64) -> Result<Vec<Record>>;

    /// Records of one category, newest first.
    fn by_category(&self, category: ActivityCategory) -> Result<Vec<Record>>;

    fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }
}

/// Newest first, ties broken by id so ordering is stable.
pub(crate) fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| {
        b.date
            .total_cmp(&a.date)
            .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
    });
}

/// In-memory [`RecordStore`], for tests and hosts without a database.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecordStore {
    records: HashMap<SessionId, Record>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, keep: impl Fn(&Record) -> bool) -> Vec<Record> {
        let mut records: Vec<Record> = self.records.values().filter(|r| keep(r)).cloned().collect();
        sort_newest_first(&mut records);
        records
    }
}

impl RecordStore for MemoryRecordStore {
    fn save(&mut self, record: &Record) -> Result<()> {
        if self.records.contains_key(&record.id) {
            return Err(SessionError::store(format!(
                "record {} already exists",
                record.id
            )));
        }
        self.records.insert(record.id, record.clone());
        debug!("[MemoryRecordStore] Saved record {}", record.id);
        Ok(())
    }

    fn update(&mut self, record: &Record) -> Result<()> {
        let slot = self
            .records
            .get_mut(&record.id)
            .ok_or_store("cannot update a record that does not exist")?;
        *slot = record.clone();
        Ok(())
    }

    fn delete(&mut self, id: &SessionId) -> Result<()> {
        self.records
            .remove(id)
            .ok_or_store("cannot delete a record that does not exist")?;
        debug!("[MemoryRecordStore] Deleted record {}", id);
        Ok(())
    }

    fn get(&self, id: &SessionId) -> Result<Option<Record>> {
        Ok(self.records.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Record>> {
        Ok(self.filtered(|_| true))
    }

    fn in_range(&self, start: f64, end: f64) -> Result<Vec<Record>> {
        Ok(self.filtered(|r| r.date >= start && r.date <= end))
    }

    fn by_category(&self, category: ActivityCategory) -> Result<Vec<Record>> {
        Ok(self.filtered(|r| r.category == category))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
