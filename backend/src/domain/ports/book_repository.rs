//! Port abstraction for book persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Book, BookChanges, BookDetail, BookFilter, BookId, CoverCandidate, NewBook};

use super::RepositoryError;

/// Persistence operations over books and their junction rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Page through books matching `filter`, ordered by id.
    async fn list(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> Result<Page<BookDetail>, RepositoryError>;

    /// Fetch one book with its relations.
    async fn find(&self, id: BookId) -> Result<Option<BookDetail>, RepositoryError>;

    /// Fetch a book by exact normalised title.
    async fn find_by_title(&self, title: &str) -> Result<Option<BookDetail>, RepositoryError>;

    /// Id of a book sharing the title (case-insensitively) or the Open
    /// Library id of `book`.
    async fn find_duplicate(&self, book: &NewBook) -> Result<Option<BookId>, RepositoryError>;

    /// Insert a book and link its relations in one transaction.
    ///
    /// A title clash yields [`RepositoryError::Conflict`]; unknown relation
    /// ids yield [`RepositoryError::MissingReference`].
    async fn create(&self, book: &NewBook) -> Result<BookId, RepositoryError>;

    /// Apply a partial update; relation sets are replaced wholesale.
    ///
    /// Returns `false` when the book does not exist.
    async fn update(&self, id: BookId, changes: &BookChanges) -> Result<bool, RepositoryError>;

    /// Delete a book; returns `false` when nothing was deleted.
    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError>;

    /// Books by an author name (case-insensitive), newest first.
    async fn by_author_name(&self, name: &str) -> Result<Vec<Book>, RepositoryError>;

    /// Books whose cover id is missing, by title, up to `limit` when given.
    async fn without_cover_ids(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<CoverCandidate>, RepositoryError>;

    /// Books whose cover URL is missing, by id.
    async fn without_cover_urls(&self) -> Result<Vec<CoverCandidate>, RepositoryError>;

    /// Store a cover id; returns `false` when the book does not exist.
    async fn set_cover_id(&self, id: BookId, cover_id: &str) -> Result<bool, RepositoryError>;

    /// Store a cover URL; returns `false` when the book does not exist.
    async fn set_cover_url(&self, id: BookId, cover_url: &str) -> Result<bool, RepositoryError>;
}
