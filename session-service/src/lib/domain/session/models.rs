use auth::Role;
use auth::TokenPair;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Identity attached to a request that passed the session guard.
///
/// Built from the directory entry, never from the token alone, and carries no
/// secret fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: EmailAddress,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Admins pass every role check; everyone else must match exactly.
    pub fn has_role(&self, required: Role) -> bool {
        self.role == Role::Admin || self.role == required
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Result of a successful password login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: AuthenticatedUser,
}
