//! Book records, write models and list filters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::author::AuthorRef;
use super::ids::{AuthorId, BookId, CollectionId, TermId};
use super::taxonomy::Term;
use super::text::normalize;

/// Stored book row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Primary key.
    pub id: BookId,
    /// Normalised title, unique case-insensitively.
    pub title: String,
    /// Year of first publication.
    pub publication_year: Option<i32>,
    /// Open Library work key without the `/works/` prefix.
    pub open_library_id: Option<String>,
    /// Open Library cover identifier.
    pub cover_id: Option<String>,
    /// Direct cover image URL, when one has been resolved.
    pub cover_url: Option<String>,
    /// ISBN-10 or ISBN-13 as supplied.
    pub isbn: Option<String>,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Whether the book still needs an Open Library cover id.
    #[must_use]
    pub fn lacks_cover_id(&self) -> bool {
        self.cover_id.as_deref().is_none_or(|id| id.trim().is_empty())
    }
}

/// Book together with its linked authors, categories and languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetail {
    /// The book row.
    #[serde(flatten)]
    pub book: Book,
    /// Linked authors ordered by name.
    pub authors: Vec<AuthorRef>,
    /// Linked categories ordered by name.
    pub categories: Vec<Term>,
    /// Linked languages ordered by name.
    pub languages: Vec<Term>,
}

/// Related records to link, by id or by name.
///
/// Names are found or created; ids must already exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links<Id> {
    /// Existing record ids.
    pub ids: Vec<Id>,
    /// Normalised names to find or create.
    pub names: Vec<String>,
}

impl<Id> Default for Links<Id> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            names: Vec::new(),
        }
    }
}

impl<Id> Links<Id> {
    /// Links made only of names.
    #[must_use]
    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            ids: Vec::new(),
            names,
        }
    }

    /// True when nothing is to be linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }
}

/// Validation failures for book writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    /// Title missing or blank.
    #[error("Title is required")]
    MissingTitle,
    /// An update carried no changes.
    #[error("No fields to update")]
    EmptyChanges,
}

/// Normalise a raw title, rejecting blank input.
///
/// # Errors
///
/// Returns [`BookValidationError::MissingTitle`] when nothing remains.
pub fn book_title(raw: Option<&str>) -> Result<String, BookValidationError> {
    raw.and_then(normalize)
        .ok_or(BookValidationError::MissingTitle)
}

/// Book to insert.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewBook {
    /// Normalised title.
    pub title: String,
    /// Year of first publication.
    pub publication_year: Option<i32>,
    /// Open Library work key.
    pub open_library_id: Option<String>,
    /// Open Library cover identifier.
    pub cover_id: Option<String>,
    /// Direct cover URL.
    pub cover_url: Option<String>,
    /// ISBN.
    pub isbn: Option<String>,
    /// Authors to link.
    pub authors: Links<AuthorId>,
    /// Categories to link.
    pub categories: Links<TermId>,
    /// Languages to link.
    pub languages: Links<TermId>,
}

/// Partial update of a book.
///
/// `None` leaves a column untouched. A `Some` relation set replaces every
/// existing link of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookChanges {
    /// New normalised title.
    pub title: Option<String>,
    /// New publication year.
    pub publication_year: Option<i32>,
    /// New Open Library work key.
    pub open_library_id: Option<String>,
    /// New cover identifier.
    pub cover_id: Option<String>,
    /// New cover URL.
    pub cover_url: Option<String>,
    /// New ISBN.
    pub isbn: Option<String>,
    /// Replacement author links.
    pub authors: Option<Links<AuthorId>>,
    /// Replacement category links.
    pub categories: Option<Links<TermId>>,
    /// Replacement language links.
    pub languages: Option<Links<TermId>>,
}

impl BookChanges {
    /// True when applying the changes would be a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.touches_columns()
            && self.authors.is_none()
            && self.categories.is_none()
            && self.languages.is_none()
    }

    /// True when at least one column of the `books` row changes.
    #[must_use]
    pub const fn touches_columns(&self) -> bool {
        self.title.is_some()
            || self.publication_year.is_some()
            || self.open_library_id.is_some()
            || self.cover_id.is_some()
            || self.cover_url.is_some()
            || self.isbn.is_some()
    }

    /// Reject empty updates.
    ///
    /// # Errors
    ///
    /// Returns [`BookValidationError::EmptyChanges`] when nothing changes.
    pub fn ensure_not_empty(self) -> Result<Self, BookValidationError> {
        if self.is_empty() {
            Err(BookValidationError::EmptyChanges)
        } else {
            Ok(self)
        }
    }
}

/// Filters accepted by book listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookFilter {
    /// Case-insensitive title substring.
    pub search: Option<String>,
    /// Only books lacking a cover id.
    pub no_cover: bool,
    /// Only books by this author.
    pub author_id: Option<AuthorId>,
    /// Only books in this category.
    pub category_id: Option<TermId>,
    /// Only books in this language.
    pub language_id: Option<TermId>,
    /// Only books in this collection.
    pub collection_id: Option<CollectionId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("  Dune  "), Ok("dune".to_owned()))]
    #[case(Some("   "), Err(BookValidationError::MissingTitle))]
    #[case(None, Err(BookValidationError::MissingTitle))]
    fn titles_are_normalised_or_rejected(
        #[case] raw: Option<&str>,
        #[case] expected: Result<String, BookValidationError>,
    ) {
        assert_eq!(book_title(raw), expected);
    }

    #[rstest]
    fn empty_changes_are_rejected() {
        assert_eq!(
            BookChanges::default().ensure_not_empty(),
            Err(BookValidationError::EmptyChanges)
        );
    }

    #[rstest]
    fn relation_only_changes_are_not_empty() {
        let changes = BookChanges {
            authors: Some(Links::from_names(vec!["frank herbert".to_owned()])),
            ..BookChanges::default()
        };
        assert!(!changes.is_empty());
        assert!(!changes.touches_columns());
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("12345"), false)]
    fn detects_missing_cover_ids(#[case] cover_id: Option<&str>, #[case] lacks: bool) {
        let book = Book {
            id: BookId::new(1),
            title: "dune".to_owned(),
            publication_year: None,
            open_library_id: None,
            cover_id: cover_id.map(str::to_owned),
            cover_url: None,
            isbn: None,
            created_at: Utc::now(),
        };
        assert_eq!(book.lacks_cover_id(), lacks);
    }
}
