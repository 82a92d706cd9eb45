//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for the topic hierarchy.
//! - Isolate SQLite query and transaction details from the service layer.
//!
//! # Invariants
//! - Every write runs in exactly one unit of work and rolls back on error.
//! - Constraint failures are reported as `ConstraintViolation`, distinct
//!   from transport errors.

pub mod hierarchy_repo;
