//! Opening a bookshelf store.
//!
//! Both entry points hand back a connection that enforces the parent links
//! between books, chapters, notes and comments, and that already carries the
//! current hierarchy schema. A connection that fails either step is dropped
//! instead of being returned half-configured.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::fmt::Display;
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a writer waits on a locked store before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the store file at `path`.
///
/// Logs one `db_open` start event and one ok/error event with the elapsed time.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_store("file", || Connection::open(path))
}

/// Opens a private in-memory store. Nothing is shared between calls.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_store("memory", Connection::open_in_memory)
}

fn open_store(
    mode: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = connect().map_err(|err| {
        log_open_failure(mode, started_at, "db_open_failed", &err);
        err
    })?;
    prepare_store(&mut conn).map_err(|err| {
        log_open_failure(mode, started_at, "db_bootstrap_failed", &err);
        err
    })?;

    info!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn prepare_store(conn: &mut Connection) -> DbResult<()> {
    // Off by default in SQLite; every parent check relies on it.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}

fn log_open_failure(mode: &str, started_at: Instant, code: &str, err: &impl Display) {
    error!(
        "event=db_open module=db status=error mode={mode} duration_ms={} error_code={code} error={err}",
        started_at.elapsed().as_millis()
    );
}
