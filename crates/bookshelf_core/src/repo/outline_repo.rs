//! Whole-book nested read model.
//!
//! # Invariants
//! - The outline is read inside one transaction, so it never mixes states
//!   from before and after a concurrent write.
//! - Children follow the same ordering as the per-level list operations.

use super::book_repo::load_required_book;
use super::chapter_repo::list_chapters_of;
use super::comment_repo::list_comments_of;
use super::note_repo::list_notes_of;
use super::{ensure_connection_ready, RepoResult};
use crate::model::book::Book;
use crate::model::chapter::Chapter;
use crate::model::comment::NoteComment;
use crate::model::note::ChapterNote;
use crate::model::BookId;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookOutline {
    #[serde(flatten)]
    pub book: Book,
    pub chapters: Vec<ChapterOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterOutline {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub notes: Vec<NoteOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOutline {
    #[serde(flatten)]
    pub note: ChapterNote,
    pub comments: Vec<NoteComment>,
}

impl BookOutline {
    /// Number of stored records in this outline, the book included.
    pub fn record_count(&self) -> usize {
        1 + self
            .chapters
            .iter()
            .map(|chapter| {
                1 + chapter
                    .notes
                    .iter()
                    .map(|note| 1 + note.comments.len())
                    .sum::<usize>()
            })
            .sum::<usize>()
    }
}

pub trait OutlineRepository {
    /// Loads one book with its full chapter/note/comment subtree.
    fn load_book_outline(&self, book_id: BookId) -> RepoResult<BookOutline>;
}

/// SQLite-backed outline reader.
pub struct SqliteOutlineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOutlineRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl OutlineRepository for SqliteOutlineRepository<'_> {
    fn load_book_outline(&self, book_id: BookId) -> RepoResult<BookOutline> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let book = load_required_book(&tx, book_id)?;

        let mut chapters = Vec::new();
        for chapter in list_chapters_of(&tx, book_id)? {
            let mut notes = Vec::new();
            for note in list_notes_of(&tx, chapter.id)? {
                let comments = list_comments_of(&tx, note.id)?;
                notes.push(NoteOutline { note, comments });
            }
            chapters.push(ChapterOutline { chapter, notes });
        }
        tx.commit()?;

        Ok(BookOutline { book, chapters })
    }
}
