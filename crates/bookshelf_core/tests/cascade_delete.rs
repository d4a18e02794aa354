use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    BookId, BookRepository, ChapterId, ChapterRepository, CommentId, CommentRepository,
    ErrorKind, NewBook, NewChapter, NewComment, NewNote, NoteId, NoteRepository,
    SqliteBookRepository, SqliteChapterRepository, SqliteCommentRepository, SqliteNoteRepository,
};
use rusqlite::Connection;

struct Tree {
    book: BookId,
    chapters: Vec<ChapterId>,
    notes: Vec<NoteId>,
    comments: Vec<CommentId>,
}

/// Builds one book with `chapters` chapters, `notes` notes per chapter and
/// `comments` comments per note.
fn build_tree(conn: &Connection, chapters: usize, notes: usize, comments: usize) -> Tree {
    let book_repo = SqliteBookRepository::try_new(conn).unwrap();
    let chapter_repo = SqliteChapterRepository::try_new(conn).unwrap();
    let note_repo = SqliteNoteRepository::try_new(conn).unwrap();
    let comment_repo = SqliteCommentRepository::try_new(conn).unwrap();

    let book = book_repo
        .create_book(&NewBook::new("Dune", "Frank Herbert"))
        .unwrap();
    let mut tree = Tree {
        book: book.id,
        chapters: Vec::new(),
        notes: Vec::new(),
        comments: Vec::new(),
    };

    for c in 0..chapters {
        let chapter = chapter_repo
            .add_chapter(book.id, &NewChapter::new(format!("Chapter {c}"), c as i64))
            .unwrap();
        tree.chapters.push(chapter.id);
        for n in 0..notes {
            let note = note_repo
                .add_note(chapter.id, &NewNote::new(format!("note {n}"), "Serzh"))
                .unwrap();
            tree.notes.push(note.id);
            for k in 0..comments {
                let comment = comment_repo
                    .add_comment(note.id, &NewComment::new(format!("comment {k}"), "Bella"))
                    .unwrap();
                tree.comments.push(comment.id);
            }
        }
    }
    tree
}

fn total_rows(conn: &Connection) -> i64 {
    ["books", "chapters", "chapter_notes", "note_comments"]
        .iter()
        .map(|table| {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get::<_, i64>(0)
            })
            .unwrap()
        })
        .sum()
}

#[test]
fn delete_book_removes_entire_subtree() {
    let conn = open_db_in_memory().unwrap();
    let (n, m, k) = (3, 2, 4);
    let tree = build_tree(&conn, n, m, k);
    let survivor = build_tree(&conn, 1, 1, 1);
    let rows_before = total_rows(&conn);

    let summary = SqliteBookRepository::try_new(&conn)
        .unwrap()
        .delete_book(tree.book)
        .unwrap();

    assert_eq!(summary.books, 1);
    assert_eq!(summary.chapters, n);
    assert_eq!(summary.notes, n * m);
    assert_eq!(summary.comments, n * m * k);
    assert_eq!(summary.total(), 1 + n + n * m + n * m * k);
    assert_eq!(total_rows(&conn), rows_before - summary.total() as i64);

    let chapter_repo = SqliteChapterRepository::try_new(&conn).unwrap();
    let note_repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let comment_repo = SqliteCommentRepository::try_new(&conn).unwrap();
    for id in &tree.chapters {
        assert_eq!(chapter_repo.get_chapter(*id).unwrap_err().kind(), ErrorKind::NotFound);
    }
    for id in &tree.notes {
        assert_eq!(note_repo.get_note(*id).unwrap_err().kind(), ErrorKind::NotFound);
    }
    for id in &tree.comments {
        assert_eq!(comment_repo.get_comment(*id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    assert_eq!(chapter_repo.list_chapters(survivor.book).unwrap().len(), 1);
    assert_eq!(comment_repo.list_comments(survivor.notes[0]).unwrap().len(), 1);
}

#[test]
fn delete_chapter_cascades_to_notes_and_comments_only() {
    let conn = open_db_in_memory().unwrap();
    let tree = build_tree(&conn, 2, 3, 2);
    let chapter_repo = SqliteChapterRepository::try_new(&conn).unwrap();

    let summary = chapter_repo.delete_chapter(tree.chapters[0]).unwrap();
    assert_eq!(summary.books, 0);
    assert_eq!(summary.chapters, 1);
    assert_eq!(summary.notes, 3);
    assert_eq!(summary.comments, 6);

    let remaining = chapter_repo.list_chapters(tree.book).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, tree.chapters[1]);

    let note_repo = SqliteNoteRepository::try_new(&conn).unwrap();
    assert_eq!(note_repo.list_notes(tree.chapters[1]).unwrap().len(), 3);
    assert_eq!(
        note_repo.list_notes(tree.chapters[0]).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn delete_note_cascades_to_comments() {
    let conn = open_db_in_memory().unwrap();
    let tree = build_tree(&conn, 1, 2, 3);
    let note_repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let summary = note_repo.delete_note(tree.notes[0]).unwrap();
    assert_eq!(summary.notes, 1);
    assert_eq!(summary.comments, 3);
    assert_eq!(summary.total(), 4);

    let comment_repo = SqliteCommentRepository::try_new(&conn).unwrap();
    for id in &tree.comments[..3] {
        assert_eq!(comment_repo.get_comment(*id).unwrap_err().kind(), ErrorKind::NotFound);
    }
    assert_eq!(comment_repo.list_comments(tree.notes[1]).unwrap().len(), 3);
}

#[test]
fn deleting_twice_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let tree = build_tree(&conn, 1, 1, 0);
    let note_repo = SqliteNoteRepository::try_new(&conn).unwrap();

    note_repo.delete_note(tree.notes[0]).unwrap();
    assert_eq!(
        note_repo.delete_note(tree.notes[0]).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn failed_cascade_rolls_back_every_table() {
    let conn = open_db_in_memory().unwrap();
    let tree = build_tree(&conn, 2, 2, 2);
    let rows_before = total_rows(&conn);

    // The book row is removed last, so this aborts after all descendants
    // have already been deleted inside the transaction.
    conn.execute_batch(
        "CREATE TRIGGER block_book_delete BEFORE DELETE ON books
         BEGIN
            SELECT RAISE(ABORT, 'book delete blocked');
         END;",
    )
    .unwrap();

    let err = SqliteBookRepository::try_new(&conn)
        .unwrap()
        .delete_book(tree.book)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(total_rows(&conn), rows_before);
    assert!(conn.is_autocommit());

    let comment_repo = SqliteCommentRepository::try_new(&conn).unwrap();
    for id in &tree.comments {
        assert!(comment_repo.get_comment(*id).is_ok());
    }
}
