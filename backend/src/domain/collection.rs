//! User-owned reading collections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{CollectionId, UserId};
use super::text::{normalize_opt, trimmed};

/// Stored collection row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    /// Primary key.
    pub id: CollectionId,
    /// Normalised display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Owning user.
    pub user_id: UserId,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
}

/// Collection with owner and size, as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    /// The collection row.
    #[serde(flatten)]
    pub collection: Collection,
    /// Username of the owner.
    pub owner_username: String,
    /// Number of books in the collection.
    pub book_count: i64,
}

/// Filters for collection listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionFilter {
    /// Only collections owned by this user.
    pub owner: Option<UserId>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
}

/// Validation failures for collection writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CollectionValidationError {
    /// Name missing or blank.
    #[error("Name is required")]
    MissingName,
    /// An update carried neither name nor description.
    #[error("At least one field (name or description) is required")]
    EmptyChanges,
    /// A book list replacement was not supplied.
    #[error("book_ids must be a list")]
    MissingBookIds,
}

/// Collection to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection {
    name: String,
    description: Option<String>,
    owner: UserId,
}

impl NewCollection {
    /// Validate a new collection, normalising its name.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionValidationError::MissingName`] for a blank name.
    pub fn try_new(
        name: Option<&str>,
        description: Option<&str>,
        owner: UserId,
    ) -> Result<Self, CollectionValidationError> {
        let name = normalize_opt(name).ok_or(CollectionValidationError::MissingName)?;
        Ok(Self {
            name,
            description: trimmed(description),
            owner,
        })
    }

    /// Normalised name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }
}

/// Partial update of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChanges {
    name: Option<String>,
    description: Option<String>,
}

impl CollectionChanges {
    /// Validate an update; at least one field must carry text.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionValidationError::EmptyChanges`] when both fields
    /// are missing or blank.
    pub fn try_new(
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, CollectionValidationError> {
        let name = normalize_opt(name);
        let description = trimmed(description);
        if name.is_none() && description.is_none() {
            return Err(CollectionValidationError::EmptyChanges);
        }
        Ok(Self { name, description })
    }

    /// New name, if changing.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// New description, if changing.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Outcome of adding a book to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// The book was added, or was already present.
    Applied,
    /// The collection does not exist.
    CollectionMissing,
    /// The book does not exist.
    BookMissing,
}
