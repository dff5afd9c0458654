//! Account domain service.
//!
//! Implements the [`AccountService`] driving port on top of the user
//! repository and the statistics query.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{AccountService, StatsQuery, UserRepository, repository_error};
use crate::domain::{
    AccountForm, Error, LoginCredentials, NewUser, Resource, Role, SessionUser, UserId,
    UserProfile,
};

/// Message returned for any credential mismatch.
pub const INVALID_CREDENTIALS: &str = "Invalid username/email or password";

/// Account service implementing the driving port.
#[derive(Clone)]
pub struct UserAccounts<U: ?Sized, S: ?Sized> {
    users: Arc<U>,
    stats: Arc<S>,
}

impl<U: ?Sized, S: ?Sized> UserAccounts<U, S> {
    /// Create a new service with the given repositories.
    pub fn new(users: Arc<U>, stats: Arc<S>) -> Self {
        Self { users, stats }
    }
}

#[async_trait]
impl<U, S> AccountService for UserAccounts<U, S>
where
    U: UserRepository + ?Sized,
    S: StatsQuery + ?Sized,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<SessionUser, Error> {
        let account = self
            .users
            .find_account(credentials.identifier())
            .await
            .map_err(repository_error(Resource::User))?;

        match account {
            Some(account) if account.password_hash.verify(credentials.password()) => {
                Ok(SessionUser::from(account.user))
            }
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    async fn signup(&self, form: &AccountForm) -> Result<SessionUser, Error> {
        let new_user = NewUser {
            username: form.username().to_owned(),
            email: form.email().to_owned(),
            password_hash: form.password_hash(),
            role: Role::User,
        };
        let user = self
            .users
            .create(&new_user)
            .await
            .map_err(repository_error(Resource::User))?;
        Ok(SessionUser::from(user))
    }

    async fn profile(&self, user: UserId) -> Result<UserProfile, Error> {
        let record = self
            .users
            .find(user)
            .await
            .map_err(repository_error(Resource::User))?
            .ok_or_else(|| Error::not_found(Resource::User.not_found_message()))?;
        let stats = self
            .stats
            .profile_stats(user)
            .await
            .map_err(repository_error(Resource::User))?;
        Ok(UserProfile {
            user: record,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockStatsQuery, MockUserRepository, RepositoryError};
    use crate::domain::{ErrorCode, PasswordHash, ProfileStats, User, UserAccount};
    use chrono::Utc;
    use rstest::rstest;

    fn alice() -> User {
        User {
            id: UserId::new(1),
            username: "alice_reader".to_owned(),
            email: "alice@example.com".to_owned(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    fn service(
        users: MockUserRepository,
        stats: MockStatsQuery,
    ) -> UserAccounts<MockUserRepository, MockStatsQuery> {
        UserAccounts::new(Arc::new(users), Arc::new(stats))
    }

    #[rstest]
    #[case("password123", true)]
    #[case("wrong-password", false)]
    #[tokio::test]
    async fn login_verifies_the_digest(#[case] password: &str, #[case] should_succeed: bool) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .withf(|identifier| identifier == "alice_reader")
            .times(1)
            .return_once(|_| {
                Ok(Some(UserAccount {
                    user: alice(),
                    password_hash: PasswordHash::from_password("password123"),
                }))
            });
        let creds =
            LoginCredentials::try_from_parts("Alice_Reader", password).expect("credentials shape");

        let result = service(users, MockStatsQuery::new()).login(&creds).await;
        match (should_succeed, result) {
            (true, Ok(user)) => {
                assert_eq!(user.id, UserId::new(1));
                assert!(user.is_admin());
            }
            (false, Err(err)) => {
                assert_eq!(err.code(), ErrorCode::Unauthorized);
                assert_eq!(err.message(), INVALID_CREDENTIALS);
            }
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(user)) => panic!("expected failure, got success: {user:?}"),
        }
    }

    #[tokio::test]
    async fn login_rejects_unknown_accounts() {
        let mut users = MockUserRepository::new();
        users.expect_find_account().return_once(|_| Ok(None));
        let creds = LoginCredentials::try_from_parts("nobody", "secret1").expect("credentials");

        let err = service(users, MockStatsQuery::new())
            .login(&creds)
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn signup_creates_a_regular_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|new_user: &NewUser| {
                new_user.role == Role::User
                    && new_user.username == "bob"
                    && new_user.password_hash.verify("secret1")
            })
            .times(1)
            .return_once(|new_user| {
                Ok(User {
                    id: UserId::new(5),
                    username: new_user.username.clone(),
                    email: new_user.email.clone(),
                    role: new_user.role,
                    created_at: Utc::now(),
                })
            });
        let form = AccountForm::signup("Bob", "bob@example.com", "secret1", "secret1")
            .expect("valid form");

        let user = service(users, MockStatsQuery::new())
            .signup(&form)
            .await
            .expect("signup succeeds");
        assert_eq!(user.id, UserId::new(5));
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn signup_reports_duplicates_as_conflicts() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .return_once(|_| Err(RepositoryError::duplicate("users_username_key")));
        let form = AccountForm::signup("bob", "bob@example.com", "secret1", "secret1")
            .expect("valid form");

        let err = service(users, MockStatsQuery::new())
            .signup(&form)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "Username or email already exists");
    }

    #[tokio::test]
    async fn profile_combines_user_and_stats() {
        let mut users = MockUserRepository::new();
        users.expect_find().return_once(|_| Ok(Some(alice())));
        let mut stats = MockStatsQuery::new();
        stats.expect_profile_stats().return_once(|_| {
            Ok(ProfileStats {
                collection_count: 2,
                ..ProfileStats::default()
            })
        });

        let profile = service(users, stats)
            .profile(UserId::new(1))
            .await
            .expect("profile");
        assert_eq!(profile.user.username, "alice_reader");
        assert_eq!(profile.stats.collection_count, 2);
    }

    #[tokio::test]
    async fn profile_of_missing_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find().return_once(|_| Ok(None));

        let err = service(users, MockStatsQuery::new())
            .profile(UserId::new(9))
            .await
            .expect_err("missing user");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "User not found");
    }
}
