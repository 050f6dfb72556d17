//! Smoking record use-case service.
//!
//! # Responsibility
//! - Provide add/list/delete entry points over an injected `RecordStore`.
//! - Hand out analytics snapshots anchored at a caller-supplied instant.
//!
//! # Invariants
//! - The service never reads the clock; `now` always comes from the caller.
//! - Every analytics call takes a fresh store snapshot.
//! - Service layer remains storage-agnostic.

use crate::analytics::aggregator::Aggregator;
use crate::model::record::{NewSmokingRecord, SmokingRecord, SmokingRecordFilter};
use crate::repo::record_repo::{RecordStore, RepoResult};
use chrono::{DateTime, TimeZone};
use log::info;
use serde::Serialize;

const DAYS_PER_WEEK: f64 = 7.0;

/// Headline numbers for a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordSummary {
    pub total_count: usize,
    pub today_count: usize,
    /// Seven-day rolling count divided by seven.
    pub weekly_average: f64,
    /// Thirty-day rolling count.
    pub monthly_count: usize,
}

/// Use-case service wrapper over a record store.
pub struct RecordService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> RecordService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Logs a new event and returns it with its assigned id.
    pub fn add(&self, input: NewSmokingRecord) -> RepoResult<SmokingRecord> {
        let record = SmokingRecord::new(input);
        self.store.append(&record)?;
        info!(
            "event=record_add module=service status=ok id={}",
            record.id
        );
        Ok(record)
    }

    /// Stores a record that already carries an id (import paths).
    pub fn import(&self, record: &SmokingRecord) -> RepoResult<()> {
        self.store.append(record)
    }

    /// Lists the full history, oldest first.
    pub fn list(&self) -> RepoResult<Vec<SmokingRecord>> {
        self.store.list()
    }

    pub fn list_filtered(&self, filter: &SmokingRecordFilter) -> RepoResult<Vec<SmokingRecord>> {
        let mut records = self.store.list()?;
        records.retain(|record| filter.matches(record));
        Ok(records)
    }

    /// Deletes by id. Returns `false` when nothing matched.
    pub fn delete(&self, id: &str) -> RepoResult<bool> {
        let removed = self.store.remove(id)?;
        info!(
            "event=record_delete module=service status={} id={id}",
            if removed { "ok" } else { "not_found" }
        );
        Ok(removed)
    }

    /// Snapshots the store into an aggregator anchored at `now`.
    ///
    /// Later writes are not visible to the returned aggregator.
    pub fn analytics<Tz: TimeZone>(&self, now: DateTime<Tz>) -> RepoResult<Aggregator<Tz>> {
        Ok(Aggregator::new(self.store.list()?, now))
    }

    /// Records on `now`'s calendar day in `now`'s timezone.
    pub fn today_count<Tz: TimeZone>(&self, now: DateTime<Tz>) -> RepoResult<usize> {
        Ok(self.analytics(now)?.stats().today_count)
    }

    pub fn summary<Tz: TimeZone>(&self, now: DateTime<Tz>) -> RepoResult<RecordSummary> {
        let aggregator = self.analytics(now)?;
        let stats = aggregator.stats();
        Ok(RecordSummary {
            total_count: aggregator.total_count(),
            today_count: stats.today_count,
            weekly_average: stats.week_count as f64 / DAYS_PER_WEEK,
            monthly_count: stats.month_count,
        })
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
