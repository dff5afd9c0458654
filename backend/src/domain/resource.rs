//! Catalogue resource kinds and the client-facing messages tied to them.

/// Kind of record a request operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A book.
    Book,
    /// An author.
    Author,
    /// A category term.
    Category,
    /// A language term.
    Language,
    /// A user-owned collection.
    Collection,
    /// A user account.
    User,
}

impl Resource {
    /// Capitalised singular label, e.g. `Book`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Author => "Author",
            Self::Category => "Category",
            Self::Language => "Language",
            Self::Collection => "Collection",
            Self::User => "User",
        }
    }

    /// Message used when a lookup misses.
    #[must_use]
    pub fn not_found_message(self) -> String {
        format!("{} not found", self.label())
    }

    /// Message used when creating a record that already exists.
    #[must_use]
    pub fn duplicate_message(self) -> String {
        match self {
            Self::Book => "Book with this title already exists".to_owned(),
            Self::User => "Username or email already exists".to_owned(),
            other => format!("{} with this name already exists", other.label()),
        }
    }

    /// Message used when renaming a record onto another record's name.
    #[must_use]
    pub fn rename_conflict_message(self) -> String {
        match self {
            Self::Book => "Another book with this title already exists".to_owned(),
            Self::User => "Username or email already exists".to_owned(),
            other => format!(
                "Another {} with this name already exists",
                other.label().to_lowercase()
            ),
        }
    }
}
