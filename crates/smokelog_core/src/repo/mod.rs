//! Record storage abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the `RecordStore` contract consumed by services.
//! - Isolate SQLite and JSON encoding details from business orchestration.
//!
//! # Invariants
//! - Store writes enforce `SmokingRecord::validate()` before persistence.
//! - `remove` reports unknown ids as `false`, not as an error.

pub mod kv_repo;
pub mod record_repo;
