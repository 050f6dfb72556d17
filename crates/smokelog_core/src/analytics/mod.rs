//! Time-series aggregation over the record history.
//!
//! # Responsibility
//! - Derive rolling-window counters and bucketed series from a record
//!   snapshot and an injected reference instant.
//!
//! # Invariants
//! - Aggregates are never persisted; they are recomputed per snapshot.

pub mod aggregator;
