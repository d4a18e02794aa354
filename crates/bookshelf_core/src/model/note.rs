//! Chapter note records, create input and partial update.

use super::{deserialize_present, reject_null, require_text, ChapterId, NoteId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Annotation attached to one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterNote {
    pub id: NoteId,
    pub chapter_id: ChapterId,
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// Input for `add_note`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewNote {
    pub content: Option<String>,
    pub author: Option<String>,
}

impl NewNote {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            author: Some(author.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.content.as_deref(), "content")?;
        require_text(self.author.as_deref(), "author")?;
        Ok(())
    }
}

/// Partial update for a note. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotePatch {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub author: Option<Option<String>>,
}

impl NotePatch {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(Some(content.into()));
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(Some(author.into()));
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        reject_null(&self.content, "content")?;
        reject_null(&self.author, "author")?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.author.is_none()
    }

    pub fn apply_to(&self, note: &mut ChapterNote) {
        if let Some(Some(content)) = &self.content {
            note.content = content.clone();
        }
        if let Some(Some(author)) = &self.author {
            note.author = author.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NotePatch;
    use crate::model::ValidationError;

    #[test]
    fn null_content_or_author_is_rejected() {
        let patch: NotePatch = serde_json::from_str(r#"{"author":null}"#).unwrap();
        assert_eq!(
            patch.validate(),
            Err(ValidationError::NullField { field: "author" })
        );

        let patch: NotePatch = serde_json::from_str(r#"{"content":"edited"}"#).unwrap();
        assert!(patch.validate().is_ok());
        assert_eq!(patch, NotePatch::default().content("edited"));
    }
}
