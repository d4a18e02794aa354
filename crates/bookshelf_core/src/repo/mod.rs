//! Repository layer over the Book -> Chapter -> Note -> Comment store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Keep SQLite query details out of transport adapters.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Every operation runs inside one transaction; cascades are all-or-nothing.
//! - Unknown ids (target or parent) surface as `RepoError::NotFound`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::{EntityKind, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod book_repo;
pub(crate) mod cascade;
pub mod chapter_repo;
pub mod comment_repo;
pub mod note_repo;
pub mod outline_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository operation.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Target entity, or a parent named by the request, does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },
    /// Reserved for uniqueness rules; no base operation produces it.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Caller-facing error category, used by adapters to pick a response class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl RepoError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Db(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => ErrorKind::Internal,
        }
    }
}

/// Rows removed by one delete operation, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionSummary {
    pub books: usize,
    pub chapters: usize,
    pub notes: usize,
    pub comments: usize,
}

impl DeletionSummary {
    pub fn total(&self) -> usize {
        self.books + self.chapters + self.notes + self.comments
    }
}

const REQUIRED_TABLES: [&str; 4] = ["books", "chapters", "chapter_notes", "note_comments"];

/// Verifies the connection is migrated before a repository is handed out.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

/// Current wall clock truncated to the stored millisecond precision.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_timestamp(value: i64, column: &'static str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

/// Fails with `NotFound` unless a row with `id` exists in `table`.
pub(crate) fn ensure_exists(
    conn: &Connection,
    table: &'static str,
    entity: EntityKind,
    id: Uuid,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::not_found(entity, id));
    }
    Ok(())
}
