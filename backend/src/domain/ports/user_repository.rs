//! Port abstraction for user account persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{NewUser, User, UserAccount, UserChanges, UserId};

use super::RepositoryError;

/// Persistence operations over user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Page through users, optionally filtered by username or email
    /// substring.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Page<User>, RepositoryError>;

    /// Fetch a user by identifier.
    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch an account, with its password digest, whose username or email
    /// equals `identifier`.
    async fn find_account(&self, identifier: &str) -> Result<Option<UserAccount>, RepositoryError>;

    /// Insert a user; a username or email clash yields
    /// [`RepositoryError::Duplicate`].
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Apply a partial update; `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, RepositoryError>;

    /// Delete a user and their collections; returns `false` when nothing was
    /// deleted.
    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;
}
