//! Record store contracts and implementations.
//!
//! # Responsibility
//! - Provide the `list`/`append`/`remove` contract consumed by services.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `SmokingRecord::validate()` before mutating storage.
//! - Ids are unique within one store; duplicates are rejected, not merged.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::record::{RecordId, RecordValidationError, SmokingRecord};
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    occurred_at,
    location,
    notes
FROM smoking_records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    DuplicateId(RecordId),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "record already exists: {id}"),
            Self::Serialization(err) => write!(f, "record serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::DuplicateId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage contract for the record history.
pub trait RecordStore {
    /// Returns every stored record, oldest first.
    fn list(&self) -> RepoResult<Vec<SmokingRecord>>;
    /// Persists one new record.
    fn append(&self, record: &SmokingRecord) -> RepoResult<()>;
    /// Deletes by id. Returns `false` when the id is unknown.
    fn remove(&self, id: &str) -> RepoResult<bool>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn list(&self) -> RepoResult<Vec<SmokingRecord>> {
        (**self).list()
    }

    fn append(&self, record: &SmokingRecord) -> RepoResult<()> {
        (**self).append(record)
    }

    fn remove(&self, id: &str) -> RepoResult<bool> {
        (**self).remove(id)
    }
}

/// SQLite-backed record store, one row per record.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn list(&self) -> RepoResult<Vec<SmokingRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY occurred_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        debug!(
            "event=record_list module=repo store=sqlite status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    fn append(&self, record: &SmokingRecord) -> RepoResult<()> {
        record.validate()?;

        let result = self.conn.execute(
            "INSERT INTO smoking_records (id, occurred_at, location, notes)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.id.as_str(),
                record.timestamp.timestamp_millis(),
                record.location.as_deref(),
                record.notes.as_deref(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::DuplicateId(record.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn remove(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM smoking_records WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<SmokingRecord> {
    let id: String = row.get("id")?;
    let occurred_at: i64 = row.get("occurred_at")?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(occurred_at).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "out-of-range timestamp `{occurred_at}` in smoking_records.occurred_at"
        ))
    })?;

    let record = SmokingRecord {
        id,
        timestamp,
        location: row.get("location")?,
        notes: row.get("notes")?,
    };
    record.validate()?;
    Ok(record)
}

/// Non-persistent record store.
///
/// Keeps insertion order; `list` returns records sorted by timestamp.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RefCell<Vec<SmokingRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, rejecting duplicate or invalid ids.
    pub fn with_records(records: impl IntoIterator<Item = SmokingRecord>) -> RepoResult<Self> {
        let store = Self::new();
        for record in records {
            store.append(&record)?;
        }
        Ok(store)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list(&self) -> RepoResult<Vec<SmokingRecord>> {
        let mut records = self.records.borrow().clone();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    fn append(&self, record: &SmokingRecord) -> RepoResult<()> {
        record.validate()?;
        let mut records = self.records.borrow_mut();
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RepoError::DuplicateId(record.id.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> RepoResult<bool> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }
}
