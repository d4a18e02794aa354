//! Leaf-first subtree deletion shared by every delete operation.
//!
//! # Invariants
//! - Rows are removed comments -> notes -> chapters -> book, so the
//!   non-cascading foreign keys are never violated mid-delete.
//! - The whole subtree is removed inside one IMMEDIATE transaction; any
//!   failure drops the transaction and rolls every table back.

use super::{ensure_exists, DeletionSummary, RepoResult};
use crate::model::EntityKind;
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Deletes `id` and all of its descendants atomically.
pub(crate) fn delete_subtree(
    conn: &Connection,
    entity: EntityKind,
    id: Uuid,
) -> RepoResult<DeletionSummary> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    ensure_exists(&tx, table_for(entity), entity, id)?;

    let key = id.to_string();
    let summary = match entity {
        EntityKind::Book => delete_book_rows(&tx, &key)?,
        EntityKind::Chapter => delete_chapter_rows(&tx, &key)?,
        EntityKind::Note => delete_note_rows(&tx, &key)?,
        EntityKind::Comment => DeletionSummary {
            comments: tx.execute("DELETE FROM note_comments WHERE id = ?1;", [key.as_str()])?,
            ..DeletionSummary::default()
        },
    };
    tx.commit()?;

    info!(
        "event=cascade_delete module=repo status=ok entity={} id={} books={} chapters={} notes={} comments={}",
        entity, id, summary.books, summary.chapters, summary.notes, summary.comments
    );
    Ok(summary)
}

pub(crate) fn table_for(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Book => "books",
        EntityKind::Chapter => "chapters",
        EntityKind::Note => "chapter_notes",
        EntityKind::Comment => "note_comments",
    }
}

fn delete_book_rows(conn: &Connection, book_id: &str) -> RepoResult<DeletionSummary> {
    let comments = conn.execute(
        "DELETE FROM note_comments
         WHERE note_id IN (
            SELECT n.id
            FROM chapter_notes n
            INNER JOIN chapters c ON c.id = n.chapter_id
            WHERE c.book_id = ?1
         );",
        [book_id],
    )?;
    let notes = conn.execute(
        "DELETE FROM chapter_notes
         WHERE chapter_id IN (SELECT id FROM chapters WHERE book_id = ?1);",
        [book_id],
    )?;
    let chapters = conn.execute("DELETE FROM chapters WHERE book_id = ?1;", [book_id])?;
    let books = conn.execute("DELETE FROM books WHERE id = ?1;", [book_id])?;

    Ok(DeletionSummary {
        books,
        chapters,
        notes,
        comments,
    })
}

fn delete_chapter_rows(conn: &Connection, chapter_id: &str) -> RepoResult<DeletionSummary> {
    let comments = conn.execute(
        "DELETE FROM note_comments
         WHERE note_id IN (SELECT id FROM chapter_notes WHERE chapter_id = ?1);",
        [chapter_id],
    )?;
    let notes = conn.execute(
        "DELETE FROM chapter_notes WHERE chapter_id = ?1;",
        [chapter_id],
    )?;
    let chapters = conn.execute("DELETE FROM chapters WHERE id = ?1;", [chapter_id])?;

    Ok(DeletionSummary {
        chapters,
        notes,
        comments,
        ..DeletionSummary::default()
    })
}

fn delete_note_rows(conn: &Connection, note_id: &str) -> RepoResult<DeletionSummary> {
    let comments = conn.execute("DELETE FROM note_comments WHERE note_id = ?1;", [note_id])?;
    let notes = conn.execute("DELETE FROM chapter_notes WHERE id = ?1;", [note_id])?;

    Ok(DeletionSummary {
        notes,
        comments,
        ..DeletionSummary::default()
    })
}
