//! Port abstraction for collection persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    BookId, CollectionChanges, CollectionFilter, CollectionId, CollectionSummary,
    MembershipChange, NewCollection,
};

use super::RepositoryError;

/// Persistence operations over collections and their book lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Page through collections, newest first.
    async fn list(
        &self,
        filter: &CollectionFilter,
        page: PageRequest,
    ) -> Result<Page<CollectionSummary>, RepositoryError>;

    /// Fetch one collection with owner name and size.
    async fn find(&self, id: CollectionId) -> Result<Option<CollectionSummary>, RepositoryError>;

    /// Insert a collection.
    async fn create(&self, collection: &NewCollection) -> Result<CollectionId, RepositoryError>;

    /// Apply a partial update; returns `false` when it does not exist.
    async fn update(
        &self,
        id: CollectionId,
        changes: &CollectionChanges,
    ) -> Result<bool, RepositoryError>;

    /// Delete a collection; returns `false` when nothing was deleted.
    async fn delete(&self, id: CollectionId) -> Result<bool, RepositoryError>;

    /// Add one book; adding twice is a no-op.
    async fn add_book(
        &self,
        id: CollectionId,
        book: BookId,
    ) -> Result<MembershipChange, RepositoryError>;

    /// Remove one book; returns `false` when it was not in the collection.
    async fn remove_book(&self, id: CollectionId, book: BookId) -> Result<bool, RepositoryError>;

    /// Replace the book list in one transaction.
    async fn replace_books(
        &self,
        id: CollectionId,
        books: &[BookId],
    ) -> Result<MembershipChange, RepositoryError>;
}
