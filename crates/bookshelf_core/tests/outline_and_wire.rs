use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{
    BookRepository, ChapterRepository, CommentRepository, EntityKind, ErrorKind, NewBook,
    NewChapter, NewComment, NewNote, NoteRepository, OutlineRepository, RepoError,
    SqliteBookRepository, SqliteChapterRepository, SqliteCommentRepository, SqliteNoteRepository,
    SqliteOutlineRepository,
};
use chrono::DateTime;
use serde_json::Value;
use uuid::Uuid;

#[test]
fn outline_nests_children_in_listing_order() {
    let conn = open_db_in_memory().unwrap();
    let book = SqliteBookRepository::try_new(&conn)
        .unwrap()
        .create_book(&NewBook::new("Dune", "Frank Herbert"))
        .unwrap();
    let chapter_repo = SqliteChapterRepository::try_new(&conn).unwrap();
    let second = chapter_repo.add_chapter(book.id, &NewChapter::new("Two", 2)).unwrap();
    let first = chapter_repo.add_chapter(book.id, &NewChapter::new("One", 1)).unwrap();

    let note_repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let older = note_repo.add_note(first.id, &NewNote::new("older", "Serzh")).unwrap();
    let newer = note_repo.add_note(first.id, &NewNote::new("newer", "Bella")).unwrap();
    let comment = SqliteCommentRepository::try_new(&conn)
        .unwrap()
        .add_comment(older.id, &NewComment::new("reply", "Bella"))
        .unwrap();

    let outline = SqliteOutlineRepository::try_new(&conn)
        .unwrap()
        .load_book_outline(book.id)
        .unwrap();

    assert_eq!(outline.book, book);
    assert_eq!(outline.chapters.len(), 2);
    assert_eq!(outline.chapters[0].chapter, first);
    assert_eq!(outline.chapters[1].chapter, second);
    assert!(outline.chapters[1].notes.is_empty());

    let notes = &outline.chapters[0].notes;
    assert_eq!(notes[0].note, newer);
    assert_eq!(notes[1].note, older);
    assert!(notes[0].comments.is_empty());
    assert_eq!(notes[1].comments, vec![comment]);
    assert_eq!(outline.record_count(), 6);
}

#[test]
fn outline_of_missing_book_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let missing = Uuid::new_v4();
    let err = SqliteOutlineRepository::try_new(&conn)
        .unwrap()
        .load_book_outline(missing)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err, RepoError::NotFound { entity: EntityKind::Book, .. }));
}

#[test]
fn records_serialize_with_camel_case_and_iso_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let book = SqliteBookRepository::try_new(&conn)
        .unwrap()
        .create_book(&NewBook::new("Dune", "Frank Herbert").with_cover_image("cover.png"))
        .unwrap();
    let chapter = SqliteChapterRepository::try_new(&conn)
        .unwrap()
        .add_chapter(book.id, &NewChapter::new("One", 1))
        .unwrap();

    let book_json = serde_json::to_value(&book).unwrap();
    assert_eq!(book_json["id"], Value::String(book.id.to_string()));
    assert_eq!(book_json["coverImage"], "cover.png");
    assert_eq!(book_json["notes"], "");
    let created_at = book_json["createdAt"].as_str().unwrap();
    assert_eq!(
        DateTime::parse_from_rfc3339(created_at).unwrap(),
        book.created_at
    );

    let chapter_json = serde_json::to_value(&chapter).unwrap();
    assert_eq!(chapter_json["chapterNumber"], 1);
    assert_eq!(chapter_json["bookId"], Value::String(book.id.to_string()));
    assert!(chapter_json.get("chapter_number").is_none());
}

#[test]
fn create_inputs_parse_from_wire_payloads() {
    let book: NewBook = serde_json::from_str(
        r#"{"title":"Dune","author":"Frank Herbert","coverImage":"cover.png"}"#,
    )
    .unwrap();
    assert_eq!(book.cover_image.as_deref(), Some("cover.png"));
    assert_eq!(book.notes, None);
    assert!(book.validate().is_ok());

    let missing_author: NewBook = serde_json::from_str(r#"{"title":"Dune"}"#).unwrap();
    assert!(missing_author.validate().is_err());

    let note: NewNote = serde_json::from_str(r#"{"content":"hi","author":"Bella"}"#).unwrap();
    assert!(note.validate().is_ok());
}
