//! Shared primitive types used across the scoring engine.

/// Whole days between two instants.
pub type Days = i64;

/// Opaque customer key (usually the customer's email).
pub type CustomerId = String;

/// A monetary amount. One currency across the whole system.
pub type Money = f64;

/// Identifier for one scoring pass over a cohort.
pub type BatchId = String;
