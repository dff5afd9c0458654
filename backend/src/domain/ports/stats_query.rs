//! Read-only aggregate queries.

use async_trait::async_trait;

use crate::domain::{DashboardCounts, ProfileStats, UserId};

use super::RepositoryError;

/// Aggregates for dashboards and profile pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsQuery: Send + Sync {
    /// Catalogue-wide row counts.
    async fn dashboard(&self) -> Result<DashboardCounts, RepositoryError>;

    /// Reading statistics for one user.
    async fn profile_stats(&self, user: UserId) -> Result<ProfileStats, RepositoryError>;
}
