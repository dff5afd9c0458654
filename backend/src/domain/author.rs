//! Author records and read models.

use serde::Serialize;

use super::ids::AuthorId;
use super::text::normalize;

/// Stored author row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// Primary key.
    pub id: AuthorId,
    /// Normalised name, unique case-insensitively.
    pub name: String,
    /// Portrait URL, when known.
    pub image_url: Option<String>,
}

/// Compact author reference embedded in book payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRef {
    /// Author id.
    pub id: AuthorId,
    /// Author name.
    pub name: String,
}

/// Author with aggregate book information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    /// The author row.
    #[serde(flatten)]
    pub author: Author,
    /// Number of linked books.
    pub book_count: i64,
    /// Titles of linked books ordered alphabetically.
    pub book_titles: Vec<String>,
}

/// Outcome of linking or unlinking an author and a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorshipChange {
    /// The link was written (or removed).
    Applied,
    /// The author does not exist.
    AuthorMissing,
    /// The book does not exist.
    BookMissing,
}

/// Validation failures for author writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorValidationError {
    /// Name missing or blank.
    #[error("Author name is required")]
    MissingName,
}

/// Normalise a raw author name, rejecting blank input.
///
/// # Errors
///
/// Returns [`AuthorValidationError::MissingName`] when nothing remains.
pub fn author_name(raw: Option<&str>) -> Result<String, AuthorValidationError> {
    raw.and_then(normalize)
        .ok_or(AuthorValidationError::MissingName)
}
