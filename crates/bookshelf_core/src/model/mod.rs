//! Domain model for the Book -> Chapter -> Note -> Comment hierarchy.
//!
//! # Responsibility
//! - Define the stored records, create inputs and partial-update patches.
//! - Own the create-time validation rules shared by every repository.
//!
//! # Invariants
//! - Every record is identified by a UUID assigned once at creation.
//! - Creation timestamps are set by the store and never change.
//! - Wire names are camelCase regardless of Rust field names.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use uuid::Uuid;

pub mod book;
pub mod chapter;
pub mod comment;
pub mod note;

pub type BookId = Uuid;
pub type ChapterId = Uuid;
pub type NoteId = Uuid;
pub type CommentId = Uuid;

/// The four levels of the hierarchy, root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Book,
    Chapter,
    Note,
    Comment,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Chapter => "chapter",
            Self::Note => "note",
            Self::Comment => "comment",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create-time input rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field absent or empty. `field` is the wire name.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    /// Explicit `null` in a patch for a field that cannot be cleared.
    #[error("field `{field}` cannot be null")]
    NullField { field: &'static str },
    #[error("chapterNumber must be non-negative, got {0}")]
    NegativeChapterNumber(i64),
    #[error("chapterNumber {0} is out of range")]
    ChapterNumberOutOfRange(i64),
}

pub(crate) fn require_text(
    value: Option<&str>,
    field: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(text) if !text.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField { field }),
    }
}

/// Rejects `Some(None)` for a patch field whose column is not nullable.
pub(crate) fn reject_null<T>(
    value: &Option<Option<T>>,
    field: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(None) => Err(ValidationError::NullField { field }),
        _ => Ok(()),
    }
}

/// Deserializes a present field into `Some`, so that with `#[serde(default)]`
/// an absent field stays `None` and an explicit `null` becomes `Some(None)`.
pub(crate) fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
