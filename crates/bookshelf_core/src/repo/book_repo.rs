//! Book repository contract and SQLite implementation.
//!
//! # Invariants
//! - `create_book` rejects a missing or empty title/author before touching storage.
//! - `update_book` applies only fields present in the patch. An explicit `null`
//!   is rejected on every field except `coverImage`; no emptiness check runs.
//! - `list_books` returns insertion order (`created_at ASC`, then rowid).

use super::cascade::delete_subtree;
use super::{
    ensure_connection_ready, now_millis, parse_timestamp, parse_uuid, DeletionSummary, RepoError,
    RepoResult,
};
use crate::model::book::{Book, BookPatch, NewBook};
use crate::model::{BookId, EntityKind};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    notes,
    cover_image,
    created_at
FROM books";

/// Repository interface for book operations.
pub trait BookRepository {
    fn create_book(&self, input: &NewBook) -> RepoResult<Book>;
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    fn get_book(&self, id: BookId) -> RepoResult<Book>;
    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<Book>;
    /// Deletes the book with every chapter, note and comment beneath it.
    fn delete_book(&self, id: BookId) -> RepoResult<DeletionSummary>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, input: &NewBook) -> RepoResult<Book> {
        input.validate()?;

        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO books (
                id,
                title,
                author,
                notes,
                cover_image,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                input.title.as_deref(),
                input.author.as_deref(),
                input.notes.as_deref().unwrap_or(""),
                input.cover_image.as_deref(),
                now_millis(),
            ],
        )?;
        let book = load_required_book(&tx, id)?;
        tx.commit()?;
        Ok(book)
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Book> {
        load_required_book(self.conn, id)
    }

    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<Book> {
        patch.validate()?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut book = load_required_book(&tx, id)?;
        if patch.is_empty() {
            return Ok(book);
        }

        patch.apply_to(&mut book);
        tx.execute(
            "UPDATE books
             SET
                title = ?2,
                author = ?3,
                notes = ?4,
                cover_image = ?5
             WHERE id = ?1;",
            params![
                id.to_string(),
                book.title,
                book.author,
                book.notes,
                book.cover_image,
            ],
        )?;
        tx.commit()?;
        Ok(book)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<DeletionSummary> {
        delete_subtree(self.conn, EntityKind::Book, id)
    }
}

pub(crate) fn load_required_book(conn: &Connection, id: BookId) -> RepoResult<Book> {
    let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_book_row(row);
    }
    Err(RepoError::not_found(EntityKind::Book, id))
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let id_text: String = row.get("id")?;
    Ok(Book {
        id: parse_uuid(&id_text, "books.id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        notes: row.get("notes")?,
        cover_image: row.get("cover_image")?,
        created_at: parse_timestamp(row.get("created_at")?, "books.created_at")?,
    })
}
