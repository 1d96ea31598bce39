//! Credential utilities shared by the session service and its clients.
//!
//! - Password hashing (Argon2id)
//! - Access/refresh credential issuing and verification
//! - The machine-readable authentication failure taxonomy
//!
//! # Examples
//!
//! ## Credential pair
//! ```
//! use auth::{CredentialCodec, CredentialKind, IdentityClaim, KindSettings, Role};
//! use chrono::Duration;
//!
//! let codec = CredentialCodec::new(
//!     KindSettings { secret: b"access_secret_at_least_32_bytes_long!", ttl: Duration::minutes(15) },
//!     KindSettings { secret: b"refresh_secret_at_least_32_bytes_long", ttl: Duration::days(7) },
//! );
//! let identity = IdentityClaim::new("u1", "admin@example.com", Role::Admin);
//! let pair = codec.issue_pair(&identity).unwrap();
//!
//! assert_eq!(codec.verify(CredentialKind::Access, &pair.access_token).unwrap(), identity);
//! assert!(codec.verify(CredentialKind::Access, &pair.refresh_token).is_err());
//! ```
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```

pub mod authenticator;
pub mod codes;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use codes::AuthErrorCode;
pub use jwt::Claims;
pub use jwt::CredentialCodec;
pub use jwt::CredentialKind;
pub use jwt::IdentityClaim;
pub use jwt::JwtError;
pub use jwt::KindSettings;
pub use jwt::Role;
pub use jwt::TokenPair;
pub use password::PasswordError;
pub use password::PasswordHasher;
