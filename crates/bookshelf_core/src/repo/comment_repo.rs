//! Note comment repository contract and SQLite implementation.
//!
//! Comments are leaves: no update and no cascade on delete.

use super::cascade::delete_subtree;
use super::{
    ensure_connection_ready, ensure_exists, now_millis, parse_timestamp, parse_uuid,
    DeletionSummary, RepoError, RepoResult,
};
use crate::model::comment::{NewComment, NoteComment};
use crate::model::{CommentId, EntityKind, NoteId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    note_id,
    content,
    author,
    timestamp
FROM note_comments";

/// Repository interface for note comment operations.
pub trait CommentRepository {
    fn add_comment(&self, note_id: NoteId, input: &NewComment) -> RepoResult<NoteComment>;
    /// Lists comments of one note, most recent first.
    fn list_comments(&self, note_id: NoteId) -> RepoResult<Vec<NoteComment>>;
    fn get_comment(&self, id: CommentId) -> RepoResult<NoteComment>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<DeletionSummary>;
}

/// SQLite-backed note comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn add_comment(&self, note_id: NoteId, input: &NewComment) -> RepoResult<NoteComment> {
        input.validate()?;

        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_exists(&tx, "chapter_notes", EntityKind::Note, note_id)?;
        tx.execute(
            "INSERT INTO note_comments (
                id,
                note_id,
                content,
                author,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                note_id.to_string(),
                input.content.as_deref(),
                input.author.as_deref(),
                now_millis(),
            ],
        )?;
        let comment = load_required_comment(&tx, id)?;
        tx.commit()?;
        Ok(comment)
    }

    fn list_comments(&self, note_id: NoteId) -> RepoResult<Vec<NoteComment>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        ensure_exists(&tx, "chapter_notes", EntityKind::Note, note_id)?;
        let comments = list_comments_of(&tx, note_id)?;
        tx.commit()?;
        Ok(comments)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<NoteComment> {
        load_required_comment(self.conn, id)
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<DeletionSummary> {
        delete_subtree(self.conn, EntityKind::Comment, id)
    }
}

pub(crate) fn list_comments_of(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<NoteComment>> {
    let mut stmt = conn.prepare(&format!(
        "{COMMENT_SELECT_SQL}
         WHERE note_id = ?1
         ORDER BY timestamp DESC, rowid DESC;"
    ))?;
    let mut rows = stmt.query([note_id.to_string()])?;
    let mut comments = Vec::new();
    while let Some(row) = rows.next()? {
        comments.push(parse_comment_row(row)?);
    }
    Ok(comments)
}

fn load_required_comment(conn: &Connection, id: CommentId) -> RepoResult<NoteComment> {
    let mut stmt = conn.prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_comment_row(row);
    }
    Err(RepoError::not_found(EntityKind::Comment, id))
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<NoteComment> {
    let id_text: String = row.get("id")?;
    let note_id_text: String = row.get("note_id")?;
    Ok(NoteComment {
        id: parse_uuid(&id_text, "note_comments.id")?,
        note_id: parse_uuid(&note_id_text, "note_comments.note_id")?,
        content: row.get("content")?,
        author: row.get("author")?,
        timestamp: parse_timestamp(row.get("timestamp")?, "note_comments.timestamp")?,
    })
}
