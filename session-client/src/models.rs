use std::fmt;

use auth::AuthErrorCode;
use auth::Role;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::errors::TransportError;

/// Short-lived credential sent as `Authorization: Bearer` on protected calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Long-lived credential, only ever sent to the refresh endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// Signed-in identity as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

/// Everything the client keeps about a session.
///
/// Both credentials and the user travel together, so a half-stored session
/// cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub user: SessionUser,
}

impl StoredSession {
    /// Same user, rotated credentials.
    pub fn rotated(&self, access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            user: self.user.clone(),
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub user: SessionUser,
}

impl From<LoginResponse> for StoredSession {
    fn from(response: LoginResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            user: response.user,
        }
    }
}

/// A call relative to the service base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body,
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PATCH,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Any HTTP response, successful or not. Empty bodies decode to `Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Machine-readable session failure code, if the body carries one.
    ///
    /// The service nests it under `data`; a top-level `code` is accepted too.
    /// Successful responses never carry a failure code, whatever their payload.
    pub fn auth_error_code(&self) -> Option<AuthErrorCode> {
        if self.is_success() {
            return None;
        }
        self.body
            .pointer("/data/code")
            .or_else(|| self.body.get("code"))
            .and_then(|code| AuthErrorCode::deserialize(code).ok())
    }

    /// Human-readable failure message, falling back to the status line.
    pub fn message(&self) -> String {
        self.body
            .pointer("/data/message")
            .or_else(|| self.body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", self.status))
    }

    /// Decode the `data` envelope (or the whole body when there is none).
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        let data = self.body.get("data").unwrap_or(&self.body);
        T::deserialize(data).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
