//! Hierarchy repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert topics, categories and suggestions and hand back the
//!   store-assigned id.
//! - Delete single rows by id and let `ON DELETE CASCADE` remove dependents.
//! - Read topics and the flat category/suggestion join for one topic.
//!
//! # Invariants
//! - The generated id is read on the same connection inside the inserting
//!   transaction.
//! - Deleting an absent id affects zero rows and is not an error.
//! - A topic snapshot (topic row plus join rows) is read inside one
//!   transaction.

use crate::db::schema::verify_schema;
use crate::db::DbError;
use crate::model::hierarchy::{
    Category, CategoryId, CategorySuggestionRow, NewCategory, NewSuggestion, NewTopic,
    Suggestion, SuggestionId, Topic, TopicId,
};
use log::{debug, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from hierarchy persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Insert rejected by a foreign key, NOT NULL or uniqueness rule.
    ConstraintViolation(String),
}

impl RepoError {
    /// Returns true when the store itself could not be reached.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Db(err) => err.is_unavailable(),
            Self::ConstraintViolation(_) => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::ConstraintViolation(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(inner, _)
                if inner.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(value.to_string())
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Topic row plus the flat join rows for its categories, read together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSnapshot {
    pub topic: Topic,
    pub rows: Vec<CategorySuggestionRow>,
}

/// Repository interface for hierarchy operations.
pub trait HierarchyRepository {
    /// Lists every topic.
    fn list_topics(&self) -> RepoResult<Vec<Topic>>;
    /// Loads one topic and its category/suggestion join rows.
    fn read_topic_snapshot(&self, topic_id: TopicId) -> RepoResult<Option<TopicSnapshot>>;
    /// Inserts one topic.
    fn create_topic(&self, topic: NewTopic) -> RepoResult<Topic>;
    /// Inserts one category.
    fn create_category(&self, category: NewCategory) -> RepoResult<Category>;
    /// Inserts one suggestion.
    fn create_suggestion(&self, suggestion: NewSuggestion) -> RepoResult<Suggestion>;
    /// Deletes one topic; returns affected row count.
    fn delete_topic(&self, topic_id: TopicId) -> RepoResult<usize>;
    /// Deletes one category; returns affected row count.
    fn delete_category(&self, category_id: CategoryId) -> RepoResult<usize>;
    /// Deletes one suggestion; returns affected row count.
    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<usize>;
}

/// SQLite-backed hierarchy repository.
pub struct SqliteHierarchyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHierarchyRepository<'conn> {
    /// Creates repository from a bootstrapped connection.
    ///
    /// Rejects connections without foreign key enforcement or schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        verify_schema(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection already checked by `verify_schema`.
    pub(crate) fn from_verified(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HierarchyRepository for SqliteHierarchyRepository<'_> {
    fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description
             FROM topics
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn read_topic_snapshot(&self, topic_id: TopicId) -> RepoResult<Option<TopicSnapshot>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let topic = match find_topic(&tx, topic_id)? {
            Some(topic) => topic,
            None => return Ok(None),
        };
        let rows = list_category_rows(&tx, topic_id)?;
        tx.commit()?;
        Ok(Some(TopicSnapshot { topic, rows }))
    }

    fn create_topic(&self, topic: NewTopic) -> RepoResult<Topic> {
        let id = write_unit(self.conn, "topic_create", |tx| insert_topic_row(tx, &topic))?;
        Ok(topic.into_topic(id))
    }

    fn create_category(&self, category: NewCategory) -> RepoResult<Category> {
        let id = write_unit(self.conn, "category_create", |tx| {
            tx.execute(
                "INSERT INTO categories (name, topic_id) VALUES (?1, ?2);",
                params![category.name.as_deref(), category.topic_id],
            )?;
            Ok(tx.last_insert_rowid())
        })?;
        Ok(category.into_category(id))
    }

    fn create_suggestion(&self, suggestion: NewSuggestion) -> RepoResult<Suggestion> {
        let id = write_unit(self.conn, "suggestion_create", |tx| {
            tx.execute(
                "INSERT INTO suggestions (name, content, category_id) VALUES (?1, ?2, ?3);",
                params![
                    suggestion.name.as_deref(),
                    suggestion.content.as_deref(),
                    suggestion.category_id,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;
        Ok(suggestion.into_suggestion(id))
    }

    fn delete_topic(&self, topic_id: TopicId) -> RepoResult<usize> {
        write_unit(self.conn, "topic_delete", |tx| {
            Ok(tx.execute("DELETE FROM topics WHERE id = ?1;", [topic_id])?)
        })
    }

    fn delete_category(&self, category_id: CategoryId) -> RepoResult<usize> {
        write_unit(self.conn, "category_delete", |tx| {
            Ok(tx.execute("DELETE FROM categories WHERE id = ?1;", [category_id])?)
        })
    }

    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<usize> {
        write_unit(self.conn, "suggestion_delete", |tx| {
            Ok(tx.execute("DELETE FROM suggestions WHERE id = ?1;", [suggestion_id])?)
        })
    }
}

/// Runs `work` inside one IMMEDIATE transaction.
///
/// Commits when `work` succeeds. On any error the transaction is rolled
/// back before the error is returned; a failed COMMIT rolls back when the
/// consumed transaction is dropped.
fn write_unit<T>(
    conn: &Connection,
    op: &'static str,
    work: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    debug!("event=unit_of_work module=repo status=start op={op}");

    let value = match work(&tx) {
        Ok(value) => value,
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=unit_of_work module=repo status=error op={op} error_code=rollback_failed error={rollback_err}"
                );
            }
            debug!("event=unit_of_work module=repo status=rolled_back op={op}");
            return Err(err);
        }
    };

    tx.commit()?;
    debug!("event=unit_of_work module=repo status=ok op={op}");
    Ok(value)
}

fn insert_topic_row(conn: &Connection, topic: &NewTopic) -> RepoResult<TopicId> {
    conn.execute(
        "INSERT INTO topics (name, description) VALUES (?1, ?2);",
        params![topic.name.as_deref(), topic.description.as_deref()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn find_topic(conn: &Connection, topic_id: TopicId) -> RepoResult<Option<Topic>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, description
         FROM topics
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([topic_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_topic_row(row)?));
    }
    Ok(None)
}

fn list_category_rows(
    conn: &Connection,
    topic_id: TopicId,
) -> RepoResult<Vec<CategorySuggestionRow>> {
    let mut stmt = conn.prepare(
        "SELECT
            c.id AS category_id,
            c.name AS category_name,
            c.topic_id AS category_topic_id,
            s.id AS suggestion_id,
            s.name AS suggestion_name,
            s.content AS suggestion_content,
            s.category_id AS suggestion_category_id
         FROM categories c
         LEFT JOIN suggestions s ON s.category_id = c.id
         WHERE c.topic_id = ?1
         ORDER BY c.id ASC, s.id ASC;",
    )?;
    let mut rows = stmt.query([topic_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(parse_category_suggestion_row(row)?);
    }
    Ok(result)
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    Ok(Topic {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
    })
}

fn parse_category_suggestion_row(row: &Row<'_>) -> RepoResult<CategorySuggestionRow> {
    let category = Category {
        id: row.get("category_id")?,
        name: row.get("category_name")?,
        topic_id: row.get("category_topic_id")?,
    };

    let suggestion_id: Option<SuggestionId> = row.get("suggestion_id")?;
    let suggestion = match suggestion_id {
        Some(id) => Some(Suggestion {
            id,
            name: row.get("suggestion_name")?,
            content: row.get("suggestion_content")?,
            category_id: row.get("suggestion_category_id")?,
        }),
        None => None,
    };

    Ok(CategorySuggestionRow {
        category,
        suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::{insert_topic_row, write_unit, RepoError};
    use crate::db::{open_db_in_memory, DbError};
    use crate::model::hierarchy::NewTopic;
    use rusqlite::ffi;

    fn topic_count(conn: &rusqlite::Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM topics;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn fault_after_insert_rolls_back_unit_of_work() {
        let conn = open_db_in_memory().unwrap();

        let err = write_unit(&conn, "topic_create", |tx| {
            let id = insert_topic_row(tx, &NewTopic::new("draft", "never committed"))?;
            assert!(id > 0);
            Err::<(), _>(RepoError::from(DbError::Sqlite(
                rusqlite::Error::SqliteFailure(
                    ffi::Error::new(ffi::SQLITE_IOERR),
                    Some("simulated store fault".to_string()),
                ),
            )))
        })
        .unwrap_err();

        assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
        assert_eq!(topic_count(&conn), 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn successful_unit_of_work_commits() {
        let conn = open_db_in_memory().unwrap();

        let id = write_unit(&conn, "topic_create", |tx| {
            insert_topic_row(tx, &NewTopic::default())
        })
        .unwrap();

        assert!(id > 0);
        assert_eq!(topic_count(&conn), 1);
    }

    #[test]
    fn constraint_failures_are_classified() {
        let err: RepoError = rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            Some("FOREIGN KEY constraint failed".to_string()),
        )
        .into();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn busy_failures_stay_transport_errors() {
        let err: RepoError =
            rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_BUSY), None).into();
        assert!(matches!(err, RepoError::Db(_)));
        assert!(err.is_unavailable());
    }
}
