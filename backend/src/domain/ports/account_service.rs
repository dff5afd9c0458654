//! Driving port for login, signup and profile use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing persistence, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{AccountForm, Error, LoginCredentials, SessionUser, UserId, UserProfile};

/// Domain use-case port for accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Validate credentials and return the identity to store in the session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionUser, Error>;

    /// Register a regular user and return the identity to store in the
    /// session.
    async fn signup(&self, form: &AccountForm) -> Result<SessionUser, Error>;

    /// Account data with reading statistics.
    async fn profile(&self, user: UserId) -> Result<UserProfile, Error>;
}
