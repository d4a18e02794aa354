//! Chapter records, create input and partial update.

use super::{deserialize_present, reject_null, require_text, BookId, ChapterId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mid-level record: child of one book, parent of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub book_id: BookId,
    pub title: String,
    /// Display number. Not unique among siblings.
    pub chapter_number: u32,
    pub created_at: DateTime<Utc>,
}

/// Input for `add_chapter`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChapter {
    pub title: Option<String>,
    pub chapter_number: Option<i64>,
}

impl NewChapter {
    pub fn new(title: impl Into<String>, chapter_number: i64) -> Self {
        Self {
            title: Some(title.into()),
            chapter_number: Some(chapter_number),
        }
    }

    /// Checks the title and returns the validated chapter number.
    pub fn validate(&self) -> Result<u32, ValidationError> {
        require_text(self.title.as_deref(), "title")?;
        let number = self
            .chapter_number
            .ok_or(ValidationError::MissingField {
                field: "chapterNumber",
            })?;
        if number < 0 {
            return Err(ValidationError::NegativeChapterNumber(number));
        }
        u32::try_from(number).map_err(|_| ValidationError::ChapterNumberOutOfRange(number))
    }
}

/// Partial update for a chapter. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPatch {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub chapter_number: Option<Option<u32>>,
}

impl ChapterPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    pub fn chapter_number(mut self, chapter_number: u32) -> Self {
        self.chapter_number = Some(Some(chapter_number));
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        reject_null(&self.title, "title")?;
        reject_null(&self.chapter_number, "chapterNumber")?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.chapter_number.is_none()
    }

    pub fn apply_to(&self, chapter: &mut Chapter) {
        if let Some(Some(title)) = &self.title {
            chapter.title = title.clone();
        }
        if let Some(Some(number)) = self.chapter_number {
            chapter.chapter_number = number;
        }
    }
}
