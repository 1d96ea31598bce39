use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::endpoints;
use crate::errors::GatewayError;
use crate::errors::LoginError;
use crate::errors::TransportError;
use crate::gateway::Gateway;
use crate::gateway::SessionEvent;
use crate::models::ApiRequest;
use crate::models::ApiResponse;
use crate::models::LoginResponse;
use crate::models::SessionUser;
use crate::models::StoredSession;
use crate::store::CredentialStore;
use crate::store::FileCredentialStore;
use crate::store::MemoryCredentialStore;
use crate::transport::HttpTransport;
use crate::transport::Transport;

/// What the UI talks to: login, logout, who is signed in, and protected calls.
pub struct SessionContext<T: Transport> {
    gateway: Gateway<T>,
}

impl SessionContext<HttpTransport> {
    /// HTTP client per `config`, persisting to `session_file` when set.
    pub fn connect(config: &ClientConfig) -> Result<Self, TransportError> {
        let store: Arc<dyn CredentialStore> = match &config.session_file {
            Some(path) => Arc::new(FileCredentialStore::new(path)),
            None => Arc::new(MemoryCredentialStore::new()),
        };

        Ok(Self::new(HttpTransport::new(config)?, store))
    }
}

impl<T: Transport> SessionContext<T> {
    pub fn new(transport: T, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            gateway: Gateway::new(transport, store),
        }
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    fn store(&self) -> &Arc<dyn CredentialStore> {
        self.gateway.store()
    }

    /// Exchange email and password for a session.
    ///
    /// A rejected login leaves whatever was stored untouched.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, LoginError> {
        let request = ApiRequest::post(
            endpoints::LOGIN,
            Some(json!({ "email": email, "password": password })),
        );
        let response = self.gateway.transport().send(&request, None).await?;

        if !response.is_success() {
            tracing::info!(status = response.status, "Login rejected");
            return Err(LoginError::Rejected {
                reason: response.message(),
                code: response.auth_error_code(),
            });
        }

        let session = StoredSession::from(response.data::<LoginResponse>()?);
        let user = session.user.clone();
        self.store().set(session);

        tracing::info!(user_id = %user.id, "Signed in");
        self.gateway.publish(SessionEvent::SignedIn(user.clone()));
        Ok(user)
    }

    /// Best-effort server logout, then always clear locally.
    ///
    /// The server call uses the stored access credential as-is and never
    /// refreshes; an expired one just leaves the server side to lapse.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(session) = self.store().get() {
            match self
                .gateway
                .transport()
                .send(
                    &ApiRequest::post(endpoints::LOGOUT, None),
                    Some(session.access_token.as_str()),
                )
                .await
            {
                Ok(response) if response.is_success() => {}
                Ok(response) => {
                    tracing::warn!(status = response.status, "Server logout refused")
                }
                Err(e) => tracing::warn!(error = %e, "Server logout failed"),
            }
        }

        if self.store().take().is_some() {
            tracing::info!("Signed out");
            self.gateway.publish(SessionEvent::SignedOut);
        }
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.store().get().map(|session| session.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().get().is_some()
    }

    /// Re-resolve a stored session at startup.
    ///
    /// Goes through the gateway, so an access credential that expired while the
    /// client was down is refreshed once before the session is reported live.
    /// Session-ending rejections clear the store; a network failure keeps it.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<SessionUser>, GatewayError> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        let response = match self.gateway.call(&ApiRequest::get(endpoints::ME)).await {
            Ok(response) => response,
            Err(GatewayError::SessionExpired(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if response.is_success() {
            let user: SessionUser = response.data()?;
            if let Some(session) = self.store().get() {
                self.store().set(StoredSession {
                    user: user.clone(),
                    ..session
                });
                return Ok(Some(user));
            }
            return Ok(None);
        }

        self.end_if_dead(&response);
        Ok(self.current_user())
    }

    /// Send a protected call. Rejections are returned verbatim; the ones that
    /// prove the session dead also sign the client out.
    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        let response = self.gateway.call(request).await?;
        self.end_if_dead(&response);
        Ok(response)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.gateway.subscribe()
    }

    fn end_if_dead(&self, response: &ApiResponse) {
        if let Some(code) = response.auth_error_code().filter(|code| code.ends_session()) {
            self.gateway.end_session(code.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use auth::AuthErrorCode;
    use auth::CredentialCodec;
    use auth::CredentialKind;
    use auth::IdentityClaim;
    use auth::JwtError;
    use auth::KindSettings;
    use auth::Role;
    use chrono::Duration;
    use chrono::Utc;
    use parking_lot::Mutex;
    use serde_json::Value;

    use super::*;
    use crate::models::AccessToken;
    use crate::models::RefreshToken;

    fn codec() -> CredentialCodec {
        CredentialCodec::new(
            KindSettings {
                secret: b"client-test-access-secret-32-bytes!!",
                ttl: Duration::minutes(15),
            },
            KindSettings {
                secret: b"client-test-refresh-secret-32-bytes!",
                ttl: Duration::days(7),
            },
        )
    }

    fn identity() -> IdentityClaim {
        IdentityClaim::new("u1", "admin@example.com", Role::Admin)
    }

    fn user() -> SessionUser {
        SessionUser {
            id: "u1".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn rejection(code: AuthErrorCode) -> ApiResponse {
        ApiResponse::new(
            code.status(),
            json!({ "status_code": code.status(), "data": { "message": code.as_str(), "code": code } }),
        )
    }

    fn failure(status: u16, message: &str) -> ApiResponse {
        ApiResponse::new(status, json!({ "status_code": status, "data": { "message": message } }))
    }

    /// Minimal session service: verifies credentials with a real codec.
    struct CodecService {
        codec: CredentialCodec,
        password: String,
        /// Forced answer for `/api/auth/me`, bypassing the codec.
        me_override: Mutex<Option<ApiResponse>>,
        refresh_calls: AtomicUsize,
        logout_calls: AtomicUsize,
    }

    impl CodecService {
        fn new() -> Self {
            Self {
                codec: codec(),
                password: "s3cret!".to_string(),
                me_override: Mutex::new(None),
                refresh_calls: AtomicUsize::new(0),
                logout_calls: AtomicUsize::new(0),
            }
        }

        fn classify(&self, bearer: Option<&str>) -> Result<IdentityClaim, AuthErrorCode> {
            let token = bearer.ok_or(AuthErrorCode::NoToken)?;
            self.codec
                .verify(CredentialKind::Access, token)
                .map_err(|e| match e {
                    JwtError::Expired => AuthErrorCode::TokenExpired,
                    _ => AuthErrorCode::InvalidToken,
                })
        }
    }

    #[async_trait]
    impl Transport for CodecService {
        async fn send(
            &self,
            request: &ApiRequest,
            bearer: Option<&str>,
        ) -> Result<ApiResponse, TransportError> {
            let body = request.body.clone().unwrap_or(Value::Null);

            Ok(match request.path.as_str() {
                endpoints::LOGIN => {
                    if body["password"] != self.password.as_str() {
                        failure(401, "Invalid credentials")
                    } else {
                        let pair = self.codec.issue_pair(&identity()).unwrap();
                        ApiResponse::new(
                            200,
                            json!({ "data": {
                                "accessToken": pair.access_token,
                                "refreshToken": pair.refresh_token,
                                "user": user(),
                            }}),
                        )
                    }
                }
                endpoints::REFRESH => {
                    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                    let token = body["refreshToken"].as_str().unwrap_or_default();
                    match self.codec.verify(CredentialKind::Refresh, token) {
                        Ok(identity) => {
                            let pair = self.codec.issue_pair(&identity).unwrap();
                            ApiResponse::new(200, json!({ "data": pair }))
                        }
                        Err(JwtError::Expired) => rejection(AuthErrorCode::TokenExpired),
                        Err(_) => rejection(AuthErrorCode::InvalidToken),
                    }
                }
                path => match self.classify(bearer) {
                    Err(code) => rejection(code),
                    Ok(_) if path == endpoints::LOGOUT => {
                        self.logout_calls.fetch_add(1, Ordering::SeqCst);
                        ApiResponse::new(204, Value::Null)
                    }
                    Ok(claim) if path == endpoints::ME => {
                        match self.me_override.lock().clone() {
                            Some(response) => response,
                            None => ApiResponse::new(
                                200,
                                json!({ "data": { "id": claim.sub, "email": claim.email, "role": claim.role } }),
                            ),
                        }
                    }
                    Ok(_) => ApiResponse::new(200, json!({ "data": { "ok": true } })),
                },
            })
        }
    }

    fn context() -> SessionContext<CodecService> {
        SessionContext::new(CodecService::new(), Arc::new(MemoryCredentialStore::new()))
    }

    /// Store a session with an expired access credential and a refresh
    /// credential issued `refresh_issued_days_ago` days back
    fn store_expired(context: &SessionContext<CodecService>, refresh_issued_days_ago: i64) {
        let codec = &context.gateway().transport().codec;
        let access = codec
            .issue_at(
                CredentialKind::Access,
                &identity(),
                Utc::now() - Duration::minutes(16),
            )
            .unwrap();
        let refresh = codec
            .issue_at(
                CredentialKind::Refresh,
                &identity(),
                Utc::now() - Duration::days(refresh_issued_days_ago),
            )
            .unwrap();

        context.store().set(StoredSession {
            access_token: AccessToken::new(access),
            refresh_token: RefreshToken::new(refresh),
            user: user(),
        });
    }

    #[tokio::test]
    async fn login_stores_session() {
        let context = context();
        let mut events = context.subscribe();

        let user = context.login("admin@example.com", "s3cret!").await.unwrap();

        assert_eq!(user.role, Role::Admin);
        assert!(context.is_authenticated());
        assert_eq!(context.current_user(), Some(user.clone()));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedIn(user));
    }

    #[tokio::test]
    async fn failed_login_leaves_store_alone() {
        let context = context();
        context.login("admin@example.com", "s3cret!").await.unwrap();
        let before = context.store().get();

        let result = context.login("admin@example.com", "wrong").await;

        assert_eq!(
            result,
            Err(LoginError::Rejected {
                reason: "Invalid credentials".to_string(),
                code: None,
            })
        );
        assert_eq!(context.store().get(), before);
    }

    #[tokio::test]
    async fn expired_access_is_refreshed_and_replayed() {
        let context = context();
        store_expired(&context, 1);

        let response = context.request(&ApiRequest::get("/api/things")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            context.gateway().transport().refresh_calls.load(Ordering::SeqCst),
            1
        );

        let stored = context.store().get().unwrap();
        let claim = codec()
            .verify(CredentialKind::Access, stored.access_token.as_str())
            .unwrap();
        assert_eq!(claim.sub, "u1");
        assert_eq!(claim.role, Role::Admin);
    }

    #[tokio::test]
    async fn expired_refresh_signs_out() {
        let context = context();
        store_expired(&context, 8);
        let mut events = context.subscribe();

        let result = context.request(&ApiRequest::get("/api/things")).await;

        assert!(matches!(result, Err(GatewayError::SessionExpired(_))));
        assert!(!context.is_authenticated());
        assert!(context.current_user().is_none());
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Terminated { .. }
        ));
    }

    #[tokio::test]
    async fn refresh_credential_rejected_as_access() {
        let context = context();
        let pair = codec().issue_pair(&identity()).unwrap();
        context.store().set(StoredSession {
            access_token: AccessToken::new(pair.refresh_token),
            refresh_token: RefreshToken::new(pair.access_token),
            user: user(),
        });

        let response = context.request(&ApiRequest::get("/api/things")).await.unwrap();

        assert_eq!(response.auth_error_code(), Some(AuthErrorCode::InvalidToken));
        assert_eq!(
            context.gateway().transport().refresh_calls.load(Ordering::SeqCst),
            0
        );
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn forbidden_role_keeps_session() {
        let context = context();
        context.login("admin@example.com", "s3cret!").await.unwrap();
        *context.gateway().transport().me_override.lock() =
            Some(rejection(AuthErrorCode::ForbiddenRole));

        let response = context.request(&ApiRequest::get(endpoints::ME)).await.unwrap();

        assert_eq!(response.status, 403);
        assert!(context.is_authenticated());
    }

    #[tokio::test]
    async fn restore_refreshes_expired_session_once() {
        let context = context();
        store_expired(&context, 1);

        let user = context.restore().await.unwrap();

        assert_eq!(user.map(|user| user.id), Some("u1".to_string()));
        assert!(context.is_authenticated());
        assert_eq!(
            context.gateway().transport().refresh_calls.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn restore_clears_deactivated_account() {
        let context = context();
        context.login("admin@example.com", "s3cret!").await.unwrap();
        *context.gateway().transport().me_override.lock() =
            Some(rejection(AuthErrorCode::AccountDeactivated));

        assert_eq!(context.restore().await, Ok(None));
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn restore_without_session_makes_no_call() {
        let context = context();
        assert_eq!(context.restore().await, Ok(None));
    }

    #[tokio::test]
    async fn logout_clears_local_session() {
        let context = context();
        context.login("admin@example.com", "s3cret!").await.unwrap();

        context.logout().await;

        assert!(!context.is_authenticated());
        assert_eq!(
            context.gateway().transport().logout_calls.load(Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn logout_with_expired_credentials_is_a_sign_out() {
        let context = context();
        store_expired(&context, 8);
        let mut events = context.subscribe();

        context.logout().await;

        assert!(!context.is_authenticated());
        assert_eq!(
            context.gateway().transport().refresh_calls.load(Ordering::SeqCst),
            0
        );
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
        assert!(events.try_recv().is_err());
    }

    struct OfflineTransport;

    #[async_trait]
    impl Transport for OfflineTransport {
        async fn send(&self, _: &ApiRequest, _: Option<&str>) -> Result<ApiResponse, TransportError> {
            Err(TransportError::Connect("network unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn offline_logout_still_clears() {
        let store = Arc::new(MemoryCredentialStore::with_session(StoredSession {
            access_token: AccessToken::new("access"),
            refresh_token: RefreshToken::new("refresh"),
            user: user(),
        }));
        let context = SessionContext::new(OfflineTransport, store);
        let mut events = context.subscribe();

        context.logout().await;

        assert!(context.current_user().is_none());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn offline_restore_keeps_session() {
        let store = Arc::new(MemoryCredentialStore::with_session(StoredSession {
            access_token: AccessToken::new("access"),
            refresh_token: RefreshToken::new("refresh"),
            user: user(),
        }));
        let context = SessionContext::new(OfflineTransport, store);

        assert!(matches!(
            context.restore().await,
            Err(GatewayError::Transport(_))
        ));
        assert!(context.is_authenticated());
    }
}
