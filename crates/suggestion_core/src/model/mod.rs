//! Domain model for the topic/category/suggestion hierarchy.
//!
//! # Responsibility
//! - Define persisted records and create inputs for each entity.
//! - Define the nested read model returned by tree reads.
//!
//! # Invariants
//! - Identifiers are store-assigned and never set by callers.
//! - Every text field is optional; absence is `None`, not an empty string.

pub mod hierarchy;
