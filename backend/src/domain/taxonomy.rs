//! Category and language terms.
//!
//! Both tables hold a single unique name, so they share one record type and
//! one repository port. [`TaxonomyKind`] supplies the wording that differs.

use serde::Serialize;

use super::ids::TermId;
use super::resource::Resource;
use super::text::normalize;

/// A category or language row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    /// Primary key.
    pub id: TermId,
    /// Normalised name, unique case-insensitively.
    pub name: String,
}

/// Which taxonomy table a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    /// `categories`.
    Category,
    /// `languages`.
    Language,
}

impl TaxonomyKind {
    /// Resource used for not-found and conflict messages.
    #[must_use]
    pub const fn resource(self) -> Resource {
        match self {
            Self::Category => Resource::Category,
            Self::Language => Resource::Language,
        }
    }

    /// Message returned when a write lacks a name.
    #[must_use]
    pub fn missing_name_message(self) -> String {
        format!("{} name is required", self.resource().label())
    }

    /// Message returned when a term has no books.
    #[must_use]
    pub const fn no_books_message(self) -> &'static str {
        match self {
            Self::Category => "No books found for this category",
            Self::Language => "No books found for this language",
        }
    }

    /// Message returned after a successful insert.
    #[must_use]
    pub fn created_message(self) -> String {
        format!("{} added", self.resource().label())
    }

    /// JSON key carrying the new id after an insert.
    #[must_use]
    pub const fn id_key(self) -> &'static str {
        match self {
            Self::Category => "category_id",
            Self::Language => "language_id",
        }
    }
}

/// Normalise a raw term name.
#[must_use]
pub fn term_name(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize)
}
