//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Turn on and verify referential-integrity enforcement.
//! - Ensure the schema exists before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`, read back and confirmed.
//! - Returned connections have all three hierarchy tables.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and ensures the hierarchy schema.
///
/// Safe to call on every process start against an existing file.
///
/// # Side effects
/// - Creates the database file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path.as_ref()))
}

/// Opens an in-memory SQLite database with the hierarchy schema applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    // Must run outside a transaction; SQLite ignores it otherwise.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    ensure_foreign_keys_enabled(conn)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    ensure_schema(conn)?;
    Ok(())
}

/// Confirms the connection enforces foreign keys.
///
/// Builds without foreign key support accept the pragma silently and keep
/// reporting `0`, so the value is read back instead of trusted.
pub(crate) fn ensure_foreign_keys_enabled(conn: &Connection) -> DbResult<()> {
    let enabled: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if enabled != 1 {
        return Err(DbError::ForeignKeysDisabled);
    }
    Ok(())
}
