use auth::AuthErrorCode;
use auth::JwtError;
use auth::Role;
use thiserror::Error;

use crate::user::errors::UserError;

/// Reasons the session guard turns a request away.
///
/// Every variant except `Directory` maps to exactly one wire code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("No access token provided")]
    NoToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User no longer exists")]
    UserNotFound,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Role {actual} is not allowed here, {required} required")]
    ForbiddenRole { required: Role, actual: Role },

    #[error("User directory unavailable: {0}")]
    Directory(String),
}

impl GuardError {
    /// Wire code for the failure; `None` for infrastructure faults.
    pub fn code(&self) -> Option<AuthErrorCode> {
        match self {
            GuardError::NoToken => Some(AuthErrorCode::NoToken),
            GuardError::TokenExpired => Some(AuthErrorCode::TokenExpired),
            GuardError::InvalidToken(_) => Some(AuthErrorCode::InvalidToken),
            GuardError::UserNotFound => Some(AuthErrorCode::UserNotFound),
            GuardError::AccountDeactivated => Some(AuthErrorCode::AccountDeactivated),
            GuardError::ForbiddenRole { .. } => Some(AuthErrorCode::ForbiddenRole),
            GuardError::Directory(_) => None,
        }
    }
}

impl From<JwtError> for GuardError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => GuardError::TokenExpired,
            other => GuardError::InvalidToken(other.to_string()),
        }
    }
}

/// Errors from the token-issuing operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Rejected(#[from] GuardError),

    #[error("Credential issuing failed: {0}")]
    Issuing(String),

    #[error(transparent)]
    User(#[from] UserError),
}
