//! Smoking record domain model.
//!
//! # Responsibility
//! - Define the canonical logged event consumed by storage and analytics.
//! - Normalize optional free-text fields at creation time.
//!
//! # Invariants
//! - `id` is non-empty and never reused for another record.
//! - Records are never mutated after creation; deletion is by id.
//! - `timestamp` is stored in UTC; calendar projection happens in analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque record identifier.
///
/// Generated ids are v4 UUID text, but imported ids are accepted verbatim.
pub type RecordId = String;

/// Validation errors for record identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Id is empty or whitespace only.
    EmptyId,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "record id must not be empty"),
        }
    }
}

impl Error for RecordValidationError {}

/// One logged smoking event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokingRecord {
    pub id: RecordId,
    /// Instant of occurrence, RFC 3339 on the wire.
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Creation input; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSmokingRecord {
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl NewSmokingRecord {
    /// Creates input for an event at `timestamp` with no free-text fields.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            location: None,
            notes: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl SmokingRecord {
    /// Creates a record with a freshly generated id.
    ///
    /// Blank `location`/`notes` collapse to `None`.
    pub fn new(input: NewSmokingRecord) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: input.timestamp,
            location: normalize_text(input.location),
            notes: normalize_text(input.notes),
        }
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    ///
    /// # Errors
    /// - Returns `RecordValidationError::EmptyId` when `id` is blank.
    pub fn with_id(
        id: impl Into<RecordId>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, RecordValidationError> {
        let record = Self {
            id: id.into(),
            timestamp,
            location: None,
            notes: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Validates record identity.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::EmptyId);
        }
        Ok(())
    }
}

/// Subset selector for history listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokingRecordFilter {
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub to: Option<DateTime<Utc>>,
    /// Exact location match.
    pub location: Option<String>,
}

impl SmokingRecordFilter {
    pub fn matches(&self, record: &SmokingRecord) -> bool {
        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.timestamp >= to {
                return false;
            }
        }
        match self.location.as_deref() {
            Some(location) => record.location.as_deref() == Some(location),
            None => true,
        }
    }
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
