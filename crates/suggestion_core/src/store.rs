//! Process-wide store handle.
//!
//! # Responsibility
//! - Own the single long-lived SQLite connection for the process.
//! - Serve each hierarchy operation through a short-lived repository and
//!   service bound to that connection.
//!
//! # Invariants
//! - The handle is opened once, schema-verified, and never replaced.
//! - Operations are serialized on the connection; concurrent callers wait
//!   on the lock instead of sharing a transaction.
//! - A poisoned lock is reported as `StoreUnavailable`, never a panic.

use crate::config::StoreConfig;
use crate::db::schema::verify_schema;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::hierarchy::{
    Category, CategoryId, NewCategory, NewSuggestion, NewTopic, Suggestion, SuggestionId,
    Topic, TopicId, TopicTree,
};
use crate::repo::hierarchy_repo::SqliteHierarchyRepository;
use crate::service::hierarchy_service::{HierarchyError, HierarchyResult, HierarchyService};
use log::error;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Shared handle to the suggestion store. Wrap in `Arc` to share across
/// threads.
pub struct SuggestionStore {
    conn: Mutex<Connection>,
}

impl SuggestionStore {
    /// Opens the store configured by `config`.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        Self::open_path(&config.db_path)
    }

    /// Opens (creating if needed) the store at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        verify_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get_topics(&self) -> HierarchyResult<Vec<Topic>> {
        self.with_service(|service| service.get_topics())
    }

    pub fn get_topic_tree(&self, topic_id: TopicId) -> HierarchyResult<TopicTree> {
        self.with_service(|service| service.get_topic_tree(topic_id))
    }

    pub fn create_topic(&self, topic: NewTopic) -> HierarchyResult<Topic> {
        self.with_service(|service| service.create_topic(topic))
    }

    pub fn create_category(&self, category: NewCategory) -> HierarchyResult<Category> {
        self.with_service(|service| service.create_category(category))
    }

    pub fn create_suggestion(&self, suggestion: NewSuggestion) -> HierarchyResult<Suggestion> {
        self.with_service(|service| service.create_suggestion(suggestion))
    }

    pub fn delete_topic(&self, topic_id: TopicId) -> HierarchyResult<usize> {
        self.with_service(|service| service.delete_topic(topic_id))
    }

    pub fn delete_category(&self, category_id: CategoryId) -> HierarchyResult<usize> {
        self.with_service(|service| service.delete_category(category_id))
    }

    pub fn delete_suggestion(&self, suggestion_id: SuggestionId) -> HierarchyResult<usize> {
        self.with_service(|service| service.delete_suggestion(suggestion_id))
    }

    fn with_service<T>(
        &self,
        f: impl FnOnce(&HierarchyService<SqliteHierarchyRepository<'_>>) -> HierarchyResult<T>,
    ) -> HierarchyResult<T> {
        let conn = self.conn.lock().map_err(|_| {
            error!(
                "event=store_lock module=store status=error error_code=store_poisoned"
            );
            HierarchyError::StoreUnavailable(
                "store handle poisoned by a panicked operation".to_string(),
            )
        })?;
        let service = HierarchyService::new(SqliteHierarchyRepository::from_verified(&conn));
        f(&service)
    }
}

#[cfg(test)]
mod tests {
    use super::SuggestionStore;
    use crate::model::hierarchy::NewTopic;
    use crate::service::hierarchy_service::FaultKind;
    use std::sync::Arc;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn store_is_shareable_across_threads() {
        assert_send_sync::<SuggestionStore>();
    }

    #[test]
    fn poisoned_handle_reports_store_unavailable() {
        let store = Arc::new(SuggestionStore::open_in_memory().unwrap());

        let poisoner = Arc::clone(&store);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.conn.lock().unwrap();
            panic!("poison the store handle");
        })
        .join();
        assert!(joined.is_err());

        let err = store.create_topic(NewTopic::default()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::StoreUnavailable);
    }
}
