//! Book records, create input and partial update.

use super::{deserialize_present, reject_null, require_text, BookId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level record owning a set of chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Free text, empty when not supplied.
    pub notes: String,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for `create_book`.
///
/// Required fields are optional here so that a missing field surfaces as a
/// `ValidationError` instead of a parse failure in the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub notes: Option<String>,
    pub cover_image: Option<String>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = Some(cover_image.into());
        self
    }

    /// Checks that title and author are present and not empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(self.title.as_deref(), "title")?;
        require_text(self.author.as_deref(), "author")?;
        Ok(())
    }
}

/// Partial update for a book. Absent fields keep their stored value.
///
/// Every field distinguishes absence (`None`) from an explicit `null`
/// (`Some(None)`). Only `cover_image` may be cleared that way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub cover_image: Option<Option<String>>,
}

impl BookPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(Some(author.into()));
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn cover_image(mut self, cover_image: Option<String>) -> Self {
        self.cover_image = Some(cover_image);
        self
    }

    /// Rejects explicit `null` on title, author and notes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        reject_null(&self.title, "title")?;
        reject_null(&self.author, "author")?;
        reject_null(&self.notes, "notes")?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.notes.is_none()
            && self.cover_image.is_none()
    }

    /// Applies present fields onto `book`. Identity and `created_at` are untouched.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(Some(title)) = &self.title {
            book.title = title.clone();
        }
        if let Some(Some(author)) = &self.author {
            book.author = author.clone();
        }
        if let Some(Some(notes)) = &self.notes {
            book.notes = notes.clone();
        }
        if let Some(cover_image) = &self.cover_image {
            book.cover_image = cover_image.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BookPatch, NewBook};
    use crate::model::ValidationError;

    #[test]
    fn new_book_requires_title_and_author() {
        let err = NewBook::new("", "Frank Herbert").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "title" });

        let err = NewBook {
            title: Some("Dune".to_string()),
            ..NewBook::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "author" });

        assert!(NewBook::new("Dune", "Frank Herbert").validate().is_ok());
    }

    #[test]
    fn patch_distinguishes_absent_and_null_cover_image() {
        let absent: BookPatch = serde_json::from_str(r#"{"notes":"reread"}"#).unwrap();
        assert_eq!(absent.cover_image, None);
        assert_eq!(absent.notes, Some(Some("reread".to_string())));

        let cleared: BookPatch = serde_json::from_str(r#"{"coverImage":null}"#).unwrap();
        assert_eq!(cleared.cover_image, Some(None));

        let set: BookPatch = serde_json::from_str(r#"{"coverImage":"cover.png"}"#).unwrap();
        assert_eq!(set.cover_image, Some(Some("cover.png".to_string())));
    }

    #[test]
    fn explicit_null_on_required_fields_fails_validation() {
        let patch: BookPatch = serde_json::from_str(r#"{"title":null,"notes":null}"#).unwrap();
        assert!(!patch.is_empty());
        assert_eq!(
            patch.validate(),
            Err(ValidationError::NullField { field: "title" })
        );

        let patch: BookPatch = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        assert_eq!(
            patch.validate(),
            Err(ValidationError::NullField { field: "notes" })
        );

        let patch: BookPatch = serde_json::from_str(r#"{"coverImage":null}"#).unwrap();
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn new_book_accepts_whitespace_title() {
        assert!(NewBook::new("   ", "Frank Herbert").validate().is_ok());
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(BookPatch::default().is_empty());
        let patch: BookPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
