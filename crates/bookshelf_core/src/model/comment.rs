//! Note comment records and create input. Comments are leaves with no update.

use super::{require_text, CommentId, NoteId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteComment {
    pub id: CommentId,
    pub note_id: NoteId,
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// Input for `add_comment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub content: Option<String>,
    pub author: Option<String>,
}

impl NewComment {
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

#[cfg(test)]
mod tests {
    use super::NewComment;
    use crate::model::ValidationError;

    #[test]
    fn content_and_author_are_required() {
        assert_eq!(
            NewComment::new("", "Bella").validate(),
            Err(ValidationError::MissingField { field: "content" })
        );
        assert_eq!(
            NewComment {
                content: Some("agreed".to_string()),
                author: None,
            }
            .validate(),
            Err(ValidationError::MissingField { field: "author" })
        );
    }
}
