//! Core use-case services.
//!
//! # Responsibility
//! - Expose the topic hierarchy operations with typed arguments.
//! - Turn repository results into the fault taxonomy callers map on.
//! - Rebuild nested topic trees from flat join rows.

pub mod hierarchy_service;
pub mod tree_assembly;
