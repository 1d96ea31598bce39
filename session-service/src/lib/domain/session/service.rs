use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenPair;

use crate::domain::session::errors::GuardError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::guard::SessionGuard;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::session::models::LoginOutcome;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Domain service issuing, rotating and dropping session credentials.
pub struct SessionService<UR>
where
    UR: UserRepository,
{
    guard: SessionGuard<UR>,
    authenticator: Arc<Authenticator>,
    repository: Arc<UR>,
}

impl<UR> SessionService<UR>
where
    UR: UserRepository,
{
    pub fn new(authenticator: Arc<Authenticator>, repository: Arc<UR>) -> Self {
        Self {
            guard: SessionGuard::new(Arc::clone(&authenticator), Arc::clone(&repository)),
            authenticator,
            repository,
        }
    }

    async fn remember(&self, user: &User, tokens: &TokenPair) -> Result<(), SessionError> {
        self.repository
            .set_refresh_token(&user.id, Some(tokens.refresh_token.clone()))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<UR> SessionServicePort for SessionService<UR>
where
    UR: UserRepository,
{
    async fn authorize(&self, bearer: Option<&str>) -> Result<AuthenticatedUser, GuardError> {
        self.guard.authorize(bearer).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let user = match EmailAddress::new(email.to_string()) {
            Ok(email) => self.repository.find_by_email(&email).await?,
            Err(_) => None,
        };

        let verified = match &user {
            Some(user) => {
                self.authenticator
                    .authenticate(password, &user.password_hash, &user.identity())
            }
            None => Err(self.authenticator.reject_unknown(password)),
        };

        let tokens = match verified {
            Ok(tokens) => tokens,
            Err(AuthenticationError::InvalidCredentials) => {
                tracing::info!("Login rejected: invalid credentials");
                return Err(SessionError::InvalidCredentials);
            }
            Err(AuthenticationError::PasswordError(e)) => return Err(UserError::from(e).into()),
            Err(AuthenticationError::JwtError(e)) => return Err(SessionError::Issuing(e.to_string())),
        };

        let user = user.ok_or(SessionError::InvalidCredentials)?;
        if !user.active {
            tracing::warn!(user_id = %user.id, "Login rejected: account deactivated");
            return Err(GuardError::AccountDeactivated.into());
        }

        self.remember(&user, &tokens).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            tokens,
            user: AuthenticatedUser::from(&user),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        let identity = self
            .authenticator
            .verify_refresh(refresh_token)
            .map_err(GuardError::from)?;

        let user = self.guard.resolve(&identity).await?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            tracing::warn!(user_id = %user.id, "Refresh rejected: credential superseded");
            return Err(
                GuardError::InvalidToken("refresh token is no longer current".to_string()).into(),
            );
        }

        let tokens = self
            .authenticator
            .issue_pair(&user.identity())
            .map_err(|e| SessionError::Issuing(e.to_string()))?;
        self.remember(&user, &tokens).await?;
        tracing::debug!(user_id = %user.id, "Session refreshed");

        Ok(tokens)
    }

    async fn logout(&self, user: &AuthenticatedUser) -> Result<(), SessionError> {
        self.repository.set_refresh_token(&user.id, None).await?;
        tracing::info!(user_id = %user.id, "User logged out");
        Ok(())
    }
}
