//! Core data access and aggregation for the suggestion board.
//!
//! Persists the Topic → Category → Suggestion hierarchy in SQLite and
//! rebuilds nested topic trees for read access.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::hierarchy::{
    Category, CategoryId, CategorySuggestionRow, CategoryTree, NewCategory, NewSuggestion,
    NewTopic, Suggestion, SuggestionId, Topic, TopicId, TopicTree,
};
pub use repo::hierarchy_repo::{
    HierarchyRepository, RepoError, RepoResult, SqliteHierarchyRepository, TopicSnapshot,
};
pub use service::hierarchy_service::{
    parse_entity_id, FaultKind, HierarchyError, HierarchyResult, HierarchyService,
};
pub use service::tree_assembly::group_category_rows;
pub use store::SuggestionStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
