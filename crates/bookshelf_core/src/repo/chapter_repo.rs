//! Chapter repository contract and SQLite implementation.
//!
//! # Invariants
//! - Chapters are only created under an existing book.
//! - Listing order is `chapter_number ASC`; equal numbers keep creation order.
//! - Deleting a chapter removes its notes and their comments atomically.

use super::cascade::delete_subtree;
use super::{
    ensure_connection_ready, ensure_exists, now_millis, parse_timestamp, parse_uuid,
    DeletionSummary, RepoError, RepoResult,
};
use crate::model::chapter::{Chapter, ChapterPatch, NewChapter};
use crate::model::{BookId, ChapterId, EntityKind};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const CHAPTER_SELECT_SQL: &str = "SELECT
    id,
    book_id,
    title,
    chapter_number,
    created_at
FROM chapters";

/// Repository interface for chapter operations.
pub trait ChapterRepository {
    fn add_chapter(&self, book_id: BookId, input: &NewChapter) -> RepoResult<Chapter>;
    /// Lists chapters of one book ordered by chapter number.
    fn list_chapters(&self, book_id: BookId) -> RepoResult<Vec<Chapter>>;
    fn get_chapter(&self, id: ChapterId) -> RepoResult<Chapter>;
    fn update_chapter(&self, id: ChapterId, patch: &ChapterPatch) -> RepoResult<Chapter>;
    fn delete_chapter(&self, id: ChapterId) -> RepoResult<DeletionSummary>;
}

/// SQLite-backed chapter repository.
pub struct SqliteChapterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChapterRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ChapterRepository for SqliteChapterRepository<'_> {
    fn add_chapter(&self, book_id: BookId, input: &NewChapter) -> RepoResult<Chapter> {
        let chapter_number = input.validate()?;

        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_exists(&tx, "books", EntityKind::Book, book_id)?;
        tx.execute(
            "INSERT INTO chapters (
                id,
                book_id,
                title,
                chapter_number,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                book_id.to_string(),
                input.title.as_deref(),
                chapter_number,
                now_millis(),
            ],
        )?;
        let chapter = load_required_chapter(&tx, id)?;
        tx.commit()?;
        Ok(chapter)
    }

    fn list_chapters(&self, book_id: BookId) -> RepoResult<Vec<Chapter>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        ensure_exists(&tx, "books", EntityKind::Book, book_id)?;
        let chapters = list_chapters_of(&tx, book_id)?;
        tx.commit()?;
        Ok(chapters)
    }

    fn get_chapter(&self, id: ChapterId) -> RepoResult<Chapter> {
        load_required_chapter(self.conn, id)
    }

    fn update_chapter(&self, id: ChapterId, patch: &ChapterPatch) -> RepoResult<Chapter> {
        patch.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut chapter = load_required_chapter(&tx, id)?;
        if patch.is_empty() {
            return Ok(chapter);
        }

        patch.apply_to(&mut chapter);
        tx.execute(
            "UPDATE chapters
             SET
                title = ?2,
                chapter_number = ?3
             WHERE id = ?1;",
            params![id.to_string(), chapter.title, chapter.chapter_number],
        )?;
        tx.commit()?;
        Ok(chapter)
    }

    fn delete_chapter(&self, id: ChapterId) -> RepoResult<DeletionSummary> {
        delete_subtree(self.conn, EntityKind::Chapter, id)
    }
}

/// Loads the chapters of `book_id` in listing order without a parent check.
pub(crate) fn list_chapters_of(conn: &Connection, book_id: BookId) -> RepoResult<Vec<Chapter>> {
    let mut stmt = conn.prepare(&format!(
        "{CHAPTER_SELECT_SQL}
         WHERE book_id = ?1
         ORDER BY chapter_number ASC, created_at ASC, rowid ASC;"
    ))?;
    let mut rows = stmt.query([book_id.to_string()])?;
    let mut chapters = Vec::new();
    while let Some(row) = rows.next()? {
        chapters.push(parse_chapter_row(row)?);
    }
    Ok(chapters)
}

fn load_required_chapter(conn: &Connection, id: ChapterId) -> RepoResult<Chapter> {
    let mut stmt = conn.prepare(&format!("{CHAPTER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_chapter_row(row);
    }
    Err(RepoError::not_found(EntityKind::Chapter, id))
}

fn parse_chapter_row(row: &Row<'_>) -> RepoResult<Chapter> {
    let id_text: String = row.get("id")?;
    let book_id_text: String = row.get("book_id")?;
    let number: i64 = row.get("chapter_number")?;
    let chapter_number = u32::try_from(number).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid chapter number `{number}` in chapters.chapter_number"
        ))
    })?;

    Ok(Chapter {
        id: parse_uuid(&id_text, "chapters.id")?,
        book_id: parse_uuid(&book_id_text, "chapters.book_id")?,
        title: row.get("title")?,
        chapter_number,
        created_at: parse_timestamp(row.get("created_at")?, "chapters.created_at")?,
    })
}
