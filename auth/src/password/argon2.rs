use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as _;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

const DECOY_SECRET: &str = "no-such-account";

/// Argon2id hashing for account passwords.
///
/// Holds a decoy hash so a login against an unknown email pays for one
/// verification, the same as a wrong password against a real account.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    decoy: Option<String>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        let argon2 = Argon2::default();
        let decoy = phc_hash(&argon2, DECOY_SECRET).ok();
        Self { argon2, decoy }
    }

    /// PHC string for `password` under a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        phc_hash(&self.argon2, password)
    }

    /// # Errors
    /// * `VerificationFailed` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let stored = PasswordHash::new(hash)
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &stored)
            .is_ok())
    }

    /// Checks `password` against the decoy and always answers `false`.
    pub fn verify_unknown(&self, password: &str) -> bool {
        if let Some(decoy) = &self.decoy {
            let _ = self.verify(password, decoy);
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn phc_hash(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}
