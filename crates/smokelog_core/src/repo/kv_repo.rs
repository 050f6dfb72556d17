//! Prefixed key/value storage with JSON payloads and optional expiry.
//!
//! # Responsibility
//! - Persist arbitrary serializable values under namespaced keys.
//! - Expose a record store that keeps the whole history as one JSON array.
//!
//! # Invariants
//! - Every physical key is `prefix + key`; `clear` never touches other
//!   prefixes.
//! - Expired or undecodable entries are deleted on read and reported as
//!   missing.

use crate::model::record::SmokingRecord;
use crate::repo::record_repo::{RecordStore, RepoError, RepoResult};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key under which `KvRecordStore` keeps the record list.
pub const RECORDS_KEY: &str = "smoking-records";

/// SQLite-backed key/value store scoped to one key prefix.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
    prefix: String,
}

impl<'conn> SqliteKvStore<'conn> {
    pub fn new(conn: &'conn Connection, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Stores `value`, expiring `ttl` after now when given.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> RepoResult<()> {
        let expires_at = ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self.set_expiring_at(key, value, expires_at)
    }

    /// Stores `value` with an absolute expiry instant.
    pub fn set_expiring_at<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let payload = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at;",
            params![
                self.physical_key(key),
                payload,
                expires_at.map(|at| at.timestamp_millis()),
            ],
        )?;
        Ok(())
    }

    /// Reads `key` against the real clock.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> RepoResult<Option<T>> {
        self.get_at(key, Utc::now())
    }

    /// Reads `key`, treating entries that expired before `now` as missing.
    pub fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<Option<T>> {
        let physical_key = self.physical_key(key);
        let entry = self
            .conn
            .query_row(
                "SELECT value, expires_at FROM kv_entries WHERE key = ?1;",
                [physical_key.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        let Some((payload, expires_at)) = entry else {
            return Ok(None);
        };

        if expires_at.is_some_and(|at| now.timestamp_millis() > at) {
            debug!("event=kv_expired module=repo key={physical_key}");
            self.remove(key)?;
            return Ok(None);
        }

        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(
                    "event=kv_decode module=repo status=error key={physical_key} error={err}"
                );
                self.remove(key)?;
                Ok(None)
            }
        }
    }

    pub fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM kv_entries WHERE key = ?1;",
            [self.physical_key(key)],
        )?;
        Ok(())
    }

    /// Deletes every entry under this store's prefix. Returns the count.
    pub fn clear(&self) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM kv_entries WHERE substr(key, 1, length(?1)) = ?1;",
            [self.prefix.as_str()],
        )?;
        Ok(removed)
    }

    pub fn has(&self, key: &str) -> RepoResult<bool> {
        Ok(self.get::<serde_json::Value>(key)?.is_some())
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

/// Record store keeping the full history as one JSON array.
pub struct KvRecordStore<'conn> {
    kv: SqliteKvStore<'conn>,
    ttl: Option<Duration>,
}

impl<'conn> KvRecordStore<'conn> {
    pub fn new(kv: SqliteKvStore<'conn>) -> Self {
        Self { kv, ttl: None }
    }

    /// Re-arms expiry of the whole list on every write.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    fn save(&self, records: &[SmokingRecord]) -> RepoResult<()> {
        self.kv.set(RECORDS_KEY, records, self.ttl)
    }
}

impl RecordStore for KvRecordStore<'_> {
    fn list(&self) -> RepoResult<Vec<SmokingRecord>> {
        let mut records: Vec<SmokingRecord> = self.kv.get(RECORDS_KEY)?.unwrap_or_default();
        for record in &records {
            record.validate()?;
        }
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    fn append(&self, record: &SmokingRecord) -> RepoResult<()> {
        record.validate()?;
        let mut records = self.list()?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RepoError::DuplicateId(record.id.clone()));
        }
        records.push(record.clone());
        self.save(&records)
    }

    fn remove(&self, id: &str) -> RepoResult<bool> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        Ok(true)
    }
}
