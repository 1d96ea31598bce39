use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Machine-readable classification of an authentication failure.
///
/// Servers put the code in every auth failure payload; clients branch on it
/// instead of the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    NoToken,
    TokenExpired,
    InvalidToken,
    UserNotFound,
    AccountDeactivated,
    ForbiddenRole,
}

impl AuthErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::NoToken => "NO_TOKEN",
            AuthErrorCode::TokenExpired => "TOKEN_EXPIRED",
            AuthErrorCode::InvalidToken => "INVALID_TOKEN",
            AuthErrorCode::UserNotFound => "USER_NOT_FOUND",
            AuthErrorCode::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            AuthErrorCode::ForbiddenRole => "FORBIDDEN_ROLE",
        }
    }

    /// Only an expired access credential can be recovered by refreshing.
    pub fn is_refreshable(&self) -> bool {
        matches!(self, AuthErrorCode::TokenExpired)
    }

    /// Codes that mean the client-side session is dead and must be torn down.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            AuthErrorCode::NoToken
                | AuthErrorCode::InvalidToken
                | AuthErrorCode::UserNotFound
                | AuthErrorCode::AccountDeactivated
        )
    }

    /// HTTP status the code is served with.
    pub fn status(&self) -> u16 {
        match self {
            AuthErrorCode::ForbiddenRole => 403,
            _ => 401,
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
