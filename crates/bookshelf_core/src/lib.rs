//! Core of the bookshelf backend: Books contain Chapters, Chapters contain
//! Notes, Notes contain Comments.
//!
//! Transport adapters open a connection with [`db::open_db`], build the
//! repositories they need over it, and map [`RepoError::kind`] onto their
//! own response classes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{Book, BookPatch, NewBook};
pub use model::chapter::{Chapter, ChapterPatch, NewChapter};
pub use model::comment::{NewComment, NoteComment};
pub use model::note::{ChapterNote, NewNote, NotePatch};
pub use model::{BookId, ChapterId, CommentId, EntityKind, NoteId, ValidationError};
pub use repo::book_repo::{BookRepository, SqliteBookRepository};
pub use repo::chapter_repo::{ChapterRepository, SqliteChapterRepository};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::outline_repo::{
    BookOutline, ChapterOutline, NoteOutline, OutlineRepository, SqliteOutlineRepository,
};
pub use repo::{DeletionSummary, ErrorKind, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
