use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::session::errors::GuardError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::session::models::LoginOutcome;

/// Port for the session lifecycle: gatekeeping and credential issuing.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Run the session guard over a bearer credential.
    async fn authorize(&self, bearer: Option<&str>) -> Result<AuthenticatedUser, GuardError>;

    /// Exchange email and password for a fresh credential pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Rejected(AccountDeactivated)` - Account is inactive
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError>;

    /// Exchange a refresh credential for a new pair.
    ///
    /// # Errors
    /// * `Rejected(TokenExpired)` - Refresh credential is past expiry
    /// * `Rejected(InvalidToken)` - Bad, wrong-kind, or superseded refresh credential
    /// * `Rejected(UserNotFound | AccountDeactivated)` - Account can no longer sign in
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError>;

    /// Drop the stored refresh credential for `user`.
    async fn logout(&self, user: &AuthenticatedUser) -> Result<(), SessionError>;
}
