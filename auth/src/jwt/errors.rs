use thiserror::Error;

use super::claims::CredentialKind;

/// Error type for credential encoding and verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Expected a {expected} credential, got {actual}")]
    WrongKind {
        expected: CredentialKind,
        actual: CredentialKind,
    },
}

impl JwtError {
    /// True only for the expiry failure; every other variant is a hard rejection.
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::Expired)
    }
}
