//! Port abstraction for author persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Author, AuthorId, AuthorSummary, AuthorshipChange, BookId};

use super::RepositoryError;

/// Persistence operations over authors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Page through authors, optionally filtered by a name substring.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<AuthorSummary>, RepositoryError>;

    /// Fetch one author with book aggregates.
    async fn find(&self, id: AuthorId) -> Result<Option<AuthorSummary>, RepositoryError>;

    /// Authors whose name contains `name`, case-insensitively.
    async fn search(&self, name: &str) -> Result<Vec<Author>, RepositoryError>;

    /// Insert an author; a name clash yields [`RepositoryError::Conflict`].
    async fn create(&self, name: &str) -> Result<Author, RepositoryError>;

    /// Rename an author; `None` when it does not exist.
    async fn rename(&self, id: AuthorId, name: &str) -> Result<Option<Author>, RepositoryError>;

    /// Delete an author; returns `false` when nothing was deleted.
    async fn delete(&self, id: AuthorId) -> Result<bool, RepositoryError>;

    /// Link an author to a book; linking twice is a no-op.
    async fn link_book(
        &self,
        author: AuthorId,
        book: BookId,
    ) -> Result<AuthorshipChange, RepositoryError>;

    /// Remove the link between an author and a book.
    async fn unlink_book(
        &self,
        author: AuthorId,
        book: BookId,
    ) -> Result<AuthorshipChange, RepositoryError>;

    /// Store a portrait URL; `None` when the author does not exist.
    async fn set_image_url(
        &self,
        id: AuthorId,
        image_url: &str,
    ) -> Result<Option<Author>, RepositoryError>;

    /// Authors lacking a portrait, most prolific first, then by name.
    async fn missing_images(&self) -> Result<Vec<Author>, RepositoryError>;
}
