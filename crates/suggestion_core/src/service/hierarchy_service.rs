//! Topic hierarchy use-case service.
//!
//! # Responsibility
//! - Validate identifiers before any repository call.
//! - Report a missing topic as `TopicNotFound` instead of an empty tree.
//! - Assemble topic trees and emit one log event per operation.
//!
//! # Invariants
//! - Identifiers passed to the repository are always `> 0`.
//! - Repository faults reach the caller typed; none are swallowed.

use crate::model::hierarchy::{
    Category, CategoryId, NewCategory, NewSuggestion, NewTopic, Suggestion, SuggestionId,
    Topic, TopicId, TopicTree,
};
use crate::repo::hierarchy_repo::{HierarchyRepository, RepoError};
use crate::service::tree_assembly::group_category_rows;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Coarse fault classes a boundary layer maps to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Argument rejected before the store was touched.
    MalformedInput,
    /// Requested topic does not exist.
    NotFound,
    /// Write rejected by a store integrity rule.
    ConstraintViolation,
    /// Store could not be opened, locked, or reached.
    StoreUnavailable,
    /// Any other store failure.
    Internal,
}

/// Errors from hierarchy service operations.
#[derive(Debug)]
pub enum HierarchyError {
    /// Identifier text is not an integer.
    MalformedId(String),
    /// Identifier is zero or negative.
    NonPositiveId(i64),
    /// No topic has this id.
    TopicNotFound(TopicId),
    /// Insert references a missing parent or breaks another rule.
    ConstraintViolation(String),
    /// Store handle cannot serve requests.
    StoreUnavailable(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl HierarchyError {
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::MalformedId(_) | Self::NonPositiveId(_) => FaultKind::MalformedInput,
            Self::TopicNotFound(_) => FaultKind::NotFound,
            Self::ConstraintViolation(_) => FaultKind::ConstraintViolation,
            Self::StoreUnavailable(_) => FaultKind::StoreUnavailable,
            Self::Repo(_) => FaultKind::Internal,
        }
    }

    /// Stable machine-readable code, used in logs and by the CLI.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedId(_) => "malformed_id",
            Self::NonPositiveId(_) => "non_positive_id",
            Self::TopicNotFound(_) => "topic_not_found",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Repo(_) => "repo_failure",
        }
    }
}

impl Display for HierarchyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedId(raw) => write!(f, "identifier `{raw}` is not an integer"),
            Self::NonPositiveId(id) => write!(f, "identifier must be positive, got {id}"),
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::ConstraintViolation(message) => write!(f, "write rejected: {message}"),
            Self::StoreUnavailable(message) => write!(f, "store unavailable: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HierarchyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HierarchyError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ConstraintViolation(message) => Self::ConstraintViolation(message),
            other if other.is_unavailable() => Self::StoreUnavailable(other.to_string()),
            other => Self::Repo(other),
        }
    }
}

/// Parses boundary text into an entity identifier.
///
/// Leading/trailing whitespace is ignored. Anything that is not a positive
/// integer is rejected without touching the store.
pub fn parse_entity_id(raw: &str) -> HierarchyResult<i64> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| HierarchyError::MalformedId(raw.to_string()))?;
    ensure_positive_id(id)
}

fn ensure_positive_id(id: i64) -> HierarchyResult<i64> {
    if id <= 0 {
        return Err(HierarchyError::NonPositiveId(id));
    }
    Ok(id)
}

/// Hierarchy service facade.
pub struct HierarchyService<R: HierarchyRepository> {
    repo: R,
}

impl<R: HierarchyRepository> HierarchyService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all topics. Empty when none exist.
    pub fn get_topics(&self) -> HierarchyResult<Vec<Topic>> {
        let started_at = Instant::now();
        let result = self.repo.list_topics().map_err(HierarchyError::from);
        match &result {
            Ok(topics) => debug!(
                "event=topics_list module=service status=ok count={} duration_ms={}",
                topics.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("topics_list", started_at, err),
        }
        result
    }

    /// Loads one topic with its categories and nested suggestions.
    ///
    /// # Errors
    /// - `NonPositiveId` when `topic_id <= 0`.
    /// - `TopicNotFound` when no topic has `topic_id`.
    pub fn get_topic_tree(&self, topic_id: TopicId) -> HierarchyResult<TopicTree> {
        let started_at = Instant::now();
        let result = self.load_topic_tree(topic_id);
        match &result {
            Ok(tree) => debug!(
                "event=topic_tree module=service status=ok topic_id={} categories={} duration_ms={}",
                tree.topic.id,
                tree.categories.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("topic_tree", started_at, err),
        }
        result
    }

    /// Creates one topic and returns it with its new id.
    pub fn create_topic(&self, topic: NewTopic) -> HierarchyResult<Topic> {
        let started_at = Instant::now();
        let result = self.repo.create_topic(topic).map_err(HierarchyError::from);
        match &result {
            Ok(topic) => info!(
                "event=topic_create module=service status=ok topic_id={} duration_ms={}",
                topic.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("topic_create", started_at, err),
        }
        result
    }

    /// Creates one category. A missing parent topic is a constraint violation.
    pub fn create_category(&self, category: NewCategory) -> HierarchyResult<Category> {
        let started_at = Instant::now();
        let result = self
            .repo
            .create_category(category)
            .map_err(HierarchyError::from);
        match &result {
            Ok(category) => info!(
                "event=category_create module=service status=ok category_id={} topic_id={:?} duration_ms={}",
                category.id,
                category.topic_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("category_create", started_at, err),
        }
        result
    }

    /// Creates one suggestion. A missing parent category is a constraint violation.
    pub fn create_suggestion(&self, suggestion: NewSuggestion) -> HierarchyResult<Suggestion> {
        let started_at = Instant::now();
        let result = self
            .repo
            .create_suggestion(suggestion)
            .map_err(HierarchyError::from);
        match &result {
            Ok(suggestion) => info!(
                "event=suggestion_create module=service status=ok suggestion_id={} category_id={:?} duration_ms={}",
                suggestion.id,
                suggestion.category_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("suggestion_create", started_at, err),
        }
        result
    }

    /// Deletes one topic and, by cascade, its categories and suggestions.
    ///
    /// Returns the number of topic rows removed (0 or 1).
    pub fn delete_topic(&self, topic_id: TopicId) -> HierarchyResult<usize> {
        self.delete_with("topic_delete", topic_id, |repo, id| repo.delete_topic(id))
    }

    /// Deletes one category and, by cascade, its suggestions.
    pub fn delete_category(&self, category_id: CategoryId) -> HierarchyResult<usize> {
        self.delete_with("category_delete", category_id, |repo, id| {
            repo.delete_category(id)
        })
    }

    /// Deletes one suggestion.
    pub fn delete_suggestion(&self, suggestion_id: SuggestionId) -> HierarchyResult<usize> {
        self.delete_with("suggestion_delete", suggestion_id, |repo, id| {
            repo.delete_suggestion(id)
        })
    }

    fn load_topic_tree(&self, topic_id: TopicId) -> HierarchyResult<TopicTree> {
        let topic_id = ensure_positive_id(topic_id)?;
        let snapshot = self
            .repo
            .read_topic_snapshot(topic_id)?
            .ok_or(HierarchyError::TopicNotFound(topic_id))?;
        Ok(TopicTree {
            topic: snapshot.topic,
            categories: group_category_rows(snapshot.rows),
        })
    }

    fn delete_with(
        &self,
        event: &'static str,
        id: i64,
        delete: impl FnOnce(&R, i64) -> Result<usize, RepoError>,
    ) -> HierarchyResult<usize> {
        let started_at = Instant::now();
        let result = ensure_positive_id(id)
            .and_then(|id| delete(&self.repo, id).map_err(HierarchyError::from));
        match &result {
            Ok(deleted) => info!(
                "event={event} module=service status=ok id={id} deleted={deleted} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure(event, started_at, err),
        }
        result
    }
}

fn log_failure(event: &'static str, started_at: Instant, err: &HierarchyError) {
    let duration_ms = started_at.elapsed().as_millis();
    match err.kind() {
        FaultKind::MalformedInput | FaultKind::NotFound | FaultKind::ConstraintViolation => warn!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
        FaultKind::StoreUnavailable | FaultKind::Internal => error!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_entity_id, FaultKind, HierarchyError, HierarchyService};
    use crate::db::DbError;
    use crate::model::hierarchy::{
        Category, NewCategory, NewSuggestion, NewTopic, Suggestion, Topic, TopicId,
    };
    use crate::repo::hierarchy_repo::{
        HierarchyRepository, RepoError, RepoResult, TopicSnapshot,
    };

    /// Repository double that fails the test on any store access.
    struct UnreachableRepository;

    impl HierarchyRepository for UnreachableRepository {
        fn list_topics(&self) -> RepoResult<Vec<Topic>> {
            panic!("store must not be touched");
        }
        fn read_topic_snapshot(&self, _topic_id: TopicId) -> RepoResult<Option<TopicSnapshot>> {
            panic!("store must not be touched");
        }
        fn create_topic(&self, _topic: NewTopic) -> RepoResult<Topic> {
            panic!("store must not be touched");
        }
        fn create_category(&self, _category: NewCategory) -> RepoResult<Category> {
            panic!("store must not be touched");
        }
        fn create_suggestion(&self, _suggestion: NewSuggestion) -> RepoResult<Suggestion> {
            panic!("store must not be touched");
        }
        fn delete_topic(&self, _topic_id: TopicId) -> RepoResult<usize> {
            panic!("store must not be touched");
        }
        fn delete_category(&self, _category_id: i64) -> RepoResult<usize> {
            panic!("store must not be touched");
        }
        fn delete_suggestion(&self, _suggestion_id: i64) -> RepoResult<usize> {
            panic!("store must not be touched");
        }
    }

    #[test]
    fn parse_entity_id_accepts_positive_integers() {
        assert_eq!(parse_entity_id("42").unwrap(), 42);
        assert_eq!(parse_entity_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn parse_entity_id_rejects_text_and_non_positive_values() {
        assert!(matches!(
            parse_entity_id("abc").unwrap_err(),
            HierarchyError::MalformedId(raw) if raw == "abc"
        ));
        assert!(matches!(
            parse_entity_id("1.5").unwrap_err(),
            HierarchyError::MalformedId(_)
        ));
        assert!(matches!(
            parse_entity_id("0").unwrap_err(),
            HierarchyError::NonPositiveId(0)
        ));
        assert_eq!(
            parse_entity_id("-3").unwrap_err().kind(),
            FaultKind::MalformedInput
        );
    }

    #[test]
    fn non_positive_ids_never_reach_repository() {
        let service = HierarchyService::new(UnreachableRepository);

        for id in [0, -1, i64::MIN] {
            assert_eq!(
                service.get_topic_tree(id).unwrap_err().kind(),
                FaultKind::MalformedInput
            );
            assert!(matches!(
                service.delete_topic(id).unwrap_err(),
                HierarchyError::NonPositiveId(value) if value == id
            ));
            assert!(service.delete_category(id).is_err());
            assert!(service.delete_suggestion(id).is_err());
        }
    }

    #[test]
    fn repository_errors_map_to_fault_kinds() {
        let constraint: HierarchyError =
            RepoError::ConstraintViolation("FOREIGN KEY constraint failed".to_string()).into();
        assert_eq!(constraint.kind(), FaultKind::ConstraintViolation);
        assert_eq!(constraint.code(), "constraint_violation");

        let schema: HierarchyError =
            RepoError::Db(DbError::MissingRequiredTable("topics")).into();
        assert_eq!(schema.kind(), FaultKind::Internal);

        assert_eq!(
            HierarchyError::TopicNotFound(9).kind(),
            FaultKind::NotFound
        );
    }
}
