//! Hierarchy schema definition and readiness checks.
//!
//! # Responsibility
//! - Create `topics`, `categories` and `suggestions` with cascading foreign
//!   keys when they are missing.
//! - Verify an existing connection carries every table and column the
//!   repository reads.
//!
//! # Invariants
//! - `ensure_schema` is idempotent: re-running it on a populated store
//!   changes nothing.
//! - Identifier columns are `INTEGER PRIMARY KEY AUTOINCREMENT`, so ids are
//!   never reused after deletes.

use super::open::ensure_foreign_keys_enabled;
use super::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables owned by the store and the columns each must expose.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("topics", &["id", "name", "description"]),
    ("categories", &["id", "name", "topic_id"]),
    ("suggestions", &["id", "name", "content", "category_id"]),
];

/// Creates the hierarchy tables and indexes inside one transaction.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;
    Ok(())
}

/// Checks that the connection enforces foreign keys and carries the schema.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    ensure_foreign_keys_enabled(conn)?;

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingRequiredTable(table));
        }
        let present = table_columns(conn, table)?;
        for &column in columns {
            if !present.iter().any(|name| name == column) {
                return Err(DbError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
