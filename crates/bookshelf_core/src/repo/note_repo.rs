//! Chapter note repository contract and SQLite implementation.
//!
//! # Invariants
//! - Notes are only created under an existing chapter.
//! - Listing order is newest first: `timestamp DESC`, then latest insert.
//! - Deleting a note removes its comments in the same transaction.

use super::cascade::delete_subtree;
use super::{
    ensure_connection_ready, ensure_exists, now_millis, parse_timestamp, parse_uuid,
    DeletionSummary, RepoError, RepoResult,
};
use crate::model::note::{ChapterNote, NewNote, NotePatch};
use crate::model::{ChapterId, EntityKind, NoteId};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    chapter_id,
    content,
    author,
    timestamp
FROM chapter_notes";

/// Repository interface for chapter note operations.
pub trait NoteRepository {
    fn add_note(&self, chapter_id: ChapterId, input: &NewNote) -> RepoResult<ChapterNote>;
    /// Lists notes of one chapter, most recent first.
    fn list_notes(&self, chapter_id: ChapterId) -> RepoResult<Vec<ChapterNote>>;
    fn get_note(&self, id: NoteId) -> RepoResult<ChapterNote>;
    fn update_note(&self, id: NoteId, patch: &NotePatch) -> RepoResult<ChapterNote>;
    fn delete_note(&self, id: NoteId) -> RepoResult<DeletionSummary>;
}

/// SQLite-backed chapter note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add_note(&self, chapter_id: ChapterId, input: &NewNote) -> RepoResult<ChapterNote> {
        input.validate()?;

        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_exists(&tx, "chapters", EntityKind::Chapter, chapter_id)?;
        tx.execute(
            "INSERT INTO chapter_notes (
                id,
                chapter_id,
                content,
                author,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                chapter_id.to_string(),
                input.content.as_deref(),
                input.author.as_deref(),
                now_millis(),
            ],
        )?;
        let note = load_required_note(&tx, id)?;
        tx.commit()?;
        Ok(note)
    }

    fn list_notes(&self, chapter_id: ChapterId) -> RepoResult<Vec<ChapterNote>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        ensure_exists(&tx, "chapters", EntityKind::Chapter, chapter_id)?;
        let notes = list_notes_of(&tx, chapter_id)?;
        tx.commit()?;
        Ok(notes)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<ChapterNote> {
        load_required_note(self.conn, id)
    }

    fn update_note(&self, id: NoteId, patch: &NotePatch) -> RepoResult<ChapterNote> {
        patch.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut note = load_required_note(&tx, id)?;
        if patch.is_empty() {
            return Ok(note);
        }

        patch.apply_to(&mut note);
        tx.execute(
            "UPDATE chapter_notes
             SET
                content = ?2,
                author = ?3
             WHERE id = ?1;",
            params![id.to_string(), note.content, note.author],
        )?;
        tx.commit()?;
        Ok(note)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<DeletionSummary> {
        delete_subtree(self.conn, EntityKind::Note, id)
    }
}

pub(crate) fn list_notes_of(
    conn: &Connection,
    chapter_id: ChapterId,
) -> RepoResult<Vec<ChapterNote>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL}
         WHERE chapter_id = ?1
         ORDER BY timestamp DESC, rowid DESC;"
    ))?;
    let mut rows = stmt.query([chapter_id.to_string()])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn load_required_note(conn: &Connection, id: NoteId) -> RepoResult<ChapterNote> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_note_row(row);
    }
    Err(RepoError::not_found(EntityKind::Note, id))
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<ChapterNote> {
    let id_text: String = row.get("id")?;
    let chapter_id_text: String = row.get("chapter_id")?;
    Ok(ChapterNote {
        id: parse_uuid(&id_text, "chapter_notes.id")?,
        chapter_id: parse_uuid(&chapter_id_text, "chapter_notes.chapter_id")?,
        content: row.get("content")?,
        author: row.get("author")?,
        timestamp: parse_timestamp(row.get("timestamp")?, "chapter_notes.timestamp")?,
    })
}
