//! Who may do what.

use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::user::{Role, User};

/// Identity stored in the session cookie after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Account id.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Account role.
    pub role: Role,
}

impl SessionUser {
    /// Whether the user has administrative rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// Admins may edit any collection; users only their own.
#[must_use]
pub fn can_edit_collection(user: &SessionUser, owner: UserId) -> bool {
    user.is_admin() || user.id == owner
}

/// Admins may act on behalf of any user; users only themselves.
#[must_use]
pub fn can_act_for(user: &SessionUser, target: UserId) -> bool {
    can_edit_collection(user, target)
}
