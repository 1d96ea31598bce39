use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Which of the two credential classes a token belongs to.
///
/// Each kind is signed with its own secret and lives for its own window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Access,
    Refresh,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Access => f.write_str("access"),
            CredentialKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Privilege level carried in every credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Minimal user-identifying payload embedded in both credential kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Subject (user identifier)
    pub sub: String,
    pub email: String,
    pub role: Role,
}

impl IdentityClaim {
    pub fn new(sub: impl ToString, email: impl ToString, role: Role) -> Self {
        Self {
            sub: sub.to_string(),
            email: email.to_string(),
            role,
        }
    }
}

/// Signed token payload: the identity claim plus kind and validity window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: IdentityClaim,

    /// Credential kind, checked on every verification
    pub typ: CredentialKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique credential id; two credentials minted in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Build claims for `identity` issued at `issued_at` and valid for `ttl`.
    pub fn issue(
        identity: IdentityClaim,
        kind: CredentialKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            identity,
            typ: kind,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
