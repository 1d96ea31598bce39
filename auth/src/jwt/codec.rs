use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::claims::Claims;
use super::claims::CredentialKind;
use super::claims::IdentityClaim;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Signing parameters for one credential kind.
pub struct KindSettings<'a> {
    pub secret: &'a [u8],
    pub ttl: Duration,
}

/// Freshly minted access/refresh pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Issues and verifies the two credential kinds.
///
/// Access and refresh tokens use independent secrets and expiry windows, and
/// the payload records its kind. A token presented as the other kind fails
/// closed as `Invalid`, never as `Expired`.
pub struct CredentialCodec {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl CredentialCodec {
    pub fn new(access: KindSettings<'_>, refresh: KindSettings<'_>) -> Self {
        Self {
            access: JwtHandler::new(access.secret),
            refresh: JwtHandler::new(refresh.secret),
            access_ttl: access.ttl,
            refresh_ttl: refresh.ttl,
        }
    }

    /// Expiry window for `kind`.
    pub fn ttl(&self, kind: CredentialKind) -> Duration {
        match kind {
            CredentialKind::Access => self.access_ttl,
            CredentialKind::Refresh => self.refresh_ttl,
        }
    }

    fn handler(&self, kind: CredentialKind) -> &JwtHandler {
        match kind {
            CredentialKind::Access => &self.access,
            CredentialKind::Refresh => &self.refresh,
        }
    }

    /// Sign a `kind` credential for `identity`, valid from now.
    pub fn issue(&self, kind: CredentialKind, identity: &IdentityClaim) -> Result<String, JwtError> {
        self.issue_at(kind, identity, Utc::now())
    }

    /// Sign a `kind` credential as if it had been issued at `issued_at`.
    pub fn issue_at(
        &self,
        kind: CredentialKind,
        identity: &IdentityClaim,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::issue(identity.clone(), kind, issued_at, self.ttl(kind));
        self.handler(kind).encode(&claims)
    }

    /// Sign both kinds for `identity`.
    pub fn issue_pair(&self, identity: &IdentityClaim) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue(CredentialKind::Access, identity)?,
            refresh_token: self.issue(CredentialKind::Refresh, identity)?,
        })
    }

    /// Verify a `kind` credential and return the identity it carries.
    ///
    /// # Errors
    /// * `Expired` - Valid signature for this kind, but past expiry
    /// * `Invalid` - Anything else, including a token of the other kind
    pub fn verify(&self, kind: CredentialKind, token: &str) -> Result<IdentityClaim, JwtError> {
        let claims = self.handler(kind).decode(token)?;

        if claims.typ != kind {
            let mismatch = JwtError::WrongKind {
                expected: kind,
                actual: claims.typ,
            };
            return Err(JwtError::Invalid(mismatch.to_string()));
        }

        Ok(claims.identity)
    }
}
