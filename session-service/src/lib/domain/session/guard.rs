use std::sync::Arc;

use auth::Authenticator;
use auth::IdentityClaim;
use auth::Role;

use crate::domain::session::errors::GuardError;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

const BEARER_PREFIX: &str = "Bearer ";

/// Gate in front of protected operations.
///
/// Classification is first-match: missing credential, expired, otherwise
/// invalid, unknown user, deactivated user. Only then is the request let
/// through with the resolved identity.
pub struct SessionGuard<UR>
where
    UR: UserRepository,
{
    authenticator: Arc<Authenticator>,
    repository: Arc<UR>,
}

impl<UR> SessionGuard<UR>
where
    UR: UserRepository,
{
    pub fn new(authenticator: Arc<Authenticator>, repository: Arc<UR>) -> Self {
        Self {
            authenticator,
            repository,
        }
    }

    /// Classify an access credential taken from the authorization carrier.
    ///
    /// # Errors
    /// * `NoToken` - No credential was presented
    /// * `TokenExpired` - Credential verified but is past its expiry
    /// * `InvalidToken` - Any other verification failure
    /// * `UserNotFound` - Directory has no such user
    /// * `AccountDeactivated` - User exists but is inactive
    /// * `Directory` - Directory lookup itself failed
    pub async fn authorize(&self, bearer: Option<&str>) -> Result<AuthenticatedUser, GuardError> {
        let token = bearer.ok_or(GuardError::NoToken)?;
        let identity = self.authenticator.verify_access(token)?;
        let user = self.resolve(&identity).await?;

        Ok(AuthenticatedUser::from(&user))
    }

    /// Look up the user a verified credential refers to and check it may still sign in.
    pub async fn resolve(&self, identity: &IdentityClaim) -> Result<User, GuardError> {
        let id = UserId::from_string(&identity.sub).map_err(|_| GuardError::UserNotFound)?;

        let user = self
            .repository
            .find_by_id(&id)
            .await
            .map_err(|e| GuardError::Directory(e.to_string()))?
            .ok_or(GuardError::UserNotFound)?;

        if !user.active {
            return Err(GuardError::AccountDeactivated);
        }

        Ok(user)
    }
}

/// Reject an authenticated identity that lacks `required`.
///
/// # Errors
/// * `ForbiddenRole` - Identity is authenticated but under-privileged
pub fn require_role(user: &AuthenticatedUser, required: Role) -> Result<(), GuardError> {
    if user.has_role(required) {
        Ok(())
    } else {
        Err(GuardError::ForbiddenRole {
            required,
            actual: user.role,
        })
    }
}

/// Pull the bearer credential out of an `Authorization` header value.
///
/// Anything that is not a non-empty `Bearer` credential counts as absent.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
