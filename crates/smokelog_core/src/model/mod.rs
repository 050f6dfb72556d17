//! Domain model for logged smoking events.
//!
//! # Responsibility
//! - Define canonical data structures shared by storage and analytics.
//! - Hold the user's goal settings and their accepted ranges.
//!
//! # Invariants
//! - Every record is identified by a stable, non-empty `RecordId`.
//! - Deletion is a hard delete by id; there are no tombstones.

pub mod record;
pub mod settings;
