use auth::AuthErrorCode;
use thiserror::Error;

/// Failure to get any HTTP response at all.
///
/// Carries no information about credential validity, so it never triggers a
/// refresh or a sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Connect(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Connect(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Refresh was refused; the local session has been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// The refreshing call went away before the refresh settled.
    #[error("Session refresh was abandoned")]
    RefreshAbandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("{reason}")]
    Rejected {
        reason: String,
        code: Option<AuthErrorCode>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
