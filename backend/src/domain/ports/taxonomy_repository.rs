//! Port abstraction for category and language persistence.
//!
//! Both tables share one shape, so one trait serves both; adapters are bound
//! to a single table at construction.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Term, TermId};

use super::RepositoryError;

/// Persistence operations over one taxonomy table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Page through terms ordered by name.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Term>, RepositoryError>;

    /// Fetch one term.
    async fn find(&self, id: TermId) -> Result<Option<Term>, RepositoryError>;

    /// Insert a term; a name clash yields [`RepositoryError::Conflict`].
    async fn create(&self, name: &str) -> Result<TermId, RepositoryError>;

    /// Rename a term; returns `false` when it does not exist.
    async fn rename(&self, id: TermId, name: &str) -> Result<bool, RepositoryError>;

    /// Delete a term; returns `false` when nothing was deleted.
    async fn delete(&self, id: TermId) -> Result<bool, RepositoryError>;
}
