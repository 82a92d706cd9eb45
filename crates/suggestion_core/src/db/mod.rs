//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the suggestion store.
//! - Create the topic/category/suggestion tables when they are missing.
//!
//! # Invariants
//! - Returned connections enforce foreign keys; cascades depend on it.
//! - Core code must not read/write application data before the schema exists.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::ensure_schema;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// `PRAGMA foreign_keys` reads back as off for this connection.
    ForeignKeysDisabled,
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl DbError {
    /// Returns true when the failure means the store cannot be reached at all
    /// (file cannot be opened, or another writer holds the lock past the
    /// busy timeout).
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(inner, _)) => matches!(
                inner.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::NotADatabase
                    | rusqlite::ErrorCode::PermissionDenied
                    | rusqlite::ErrorCode::ReadOnly
            ),
            _ => false,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::ForeignKeysDisabled => write!(
                f,
                "foreign key enforcement is disabled; cascading deletes would be skipped"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "suggestion store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "suggestion store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::ForeignKeysDisabled => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
