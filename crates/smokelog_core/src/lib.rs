//! Core domain logic for the smoking log.
//! This crate owns record storage, goal settings and the time-series
//! aggregation engine.

pub mod analytics;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analytics::aggregator::{Aggregator, DailyBucket, HourlyBucket, MonthlyBucket, Stats};
pub use config::CoreConfig;
pub use logging::{
    default_log_level, flush_logging, init_logging, logging_status, LogLevel, LoggingError,
};
pub use model::record::{
    NewSmokingRecord, RecordId, RecordValidationError, SmokingRecord, SmokingRecordFilter,
};
pub use model::settings::{Settings, SettingsValidationError};
pub use repo::kv_repo::{KvRecordStore, SqliteKvStore, RECORDS_KEY};
pub use repo::record_repo::{
    InMemoryRecordStore, RecordStore, RepoError, RepoResult, SqliteRecordStore,
};
pub use service::record_service::{RecordService, RecordSummary};
pub use service::settings_service::{SettingsError, SettingsResult, SettingsService, SETTINGS_KEY};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
