//! Destructive maintenance used by the seeding tool.

use async_trait::async_trait;

use super::RepositoryError;

/// Bulk maintenance over the whole catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueMaintenance: Send + Sync {
    /// Delete every row from every table and restart identity sequences.
    async fn reset(&self) -> Result<(), RepositoryError>;
}
