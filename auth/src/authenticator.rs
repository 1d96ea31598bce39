use crate::jwt::CredentialCodec;
use crate::jwt::CredentialKind;
use crate::jwt::IdentityClaim;
use crate::jwt::JwtError;
use crate::jwt::TokenPair;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and credential issuing.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: CredentialCodec,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    pub fn new(codec: CredentialCodec) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            codec,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password and mint a fresh credential pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &IdentityClaim,
    ) -> Result<TokenPair, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.codec.issue_pair(identity)?)
    }

    /// Fail a login attempt for an identifier with no account behind it.
    ///
    /// Pays for one hashing round so the answer takes as long as a wrong password.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        self.password_hasher.verify_unknown(password);
        AuthenticationError::InvalidCredentials
    }

    /// Mint a credential pair without password verification (refresh flow).
    pub fn issue_pair(&self, identity: &IdentityClaim) -> Result<TokenPair, JwtError> {
        self.codec.issue_pair(identity)
    }

    /// Verify an access credential.
    pub fn verify_access(&self, token: &str) -> Result<IdentityClaim, JwtError> {
        self.codec.verify(CredentialKind::Access, token)
    }

    /// Verify a refresh credential.
    pub fn verify_refresh(&self, token: &str) -> Result<IdentityClaim, JwtError> {
        self.codec.verify(CredentialKind::Refresh, token)
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::KindSettings;
    use crate::jwt::Role;

    fn authenticator() -> Authenticator {
        Authenticator::new(CredentialCodec::new(
            KindSettings {
                secret: b"test_access_secret_at_least_32_bytes!",
                ttl: Duration::minutes(15),
            },
            KindSettings {
                secret: b"test_refresh_secret_at_least_32_bytes",
                ttl: Duration::days(7),
            },
        ))
    }

    fn identity() -> IdentityClaim {
        IdentityClaim::new("user123", "user@example.com", Role::User)
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let pair = authenticator
            .authenticate(password, &hash, &identity())
            .expect("Authentication failed");

        let access = authenticator
            .verify_access(&pair.access_token)
            .expect("Access token validation failed");
        let refresh = authenticator
            .verify_refresh(&pair.refresh_token)
            .expect("Refresh token validation failed");
        assert_eq!(access, identity());
        assert_eq!(refresh, identity());
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();
        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", &hash, &identity());
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_unknown_account() {
        let err = authenticator().reject_unknown("my_password");
        assert!(matches!(err, AuthenticationError::InvalidCredentials));
    }

    #[test]
    fn test_verify_invalid_token() {
        let result = authenticator().verify_access("invalid.token.here");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }
}
