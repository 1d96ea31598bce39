use std::sync::Arc;

use auth::Authenticator;
use auth::CredentialCodec;
use auth::CredentialKind;
use auth::KindSettings;
use auth::Role;
use chrono::Duration;
use chrono::Utc;
use session_service::domain::session::service::SessionService;
use session_service::domain::user::models::CreateUserCommand;
use session_service::domain::user::models::EmailAddress;
use session_service::domain::user::models::User;
use session_service::domain::user::models::UserId;
use session_service::domain::user::ports::UserServicePort;
use session_service::domain::user::service::UserService;
use session_service::inbound::http::router::create_router;
use session_service::outbound::repositories::InMemoryUserRepository;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-for-jwt-signing-32-bytes";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-jwt-signing-32-bytes";

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-pass_word!";
pub const USER_EMAIL: &str = "nicola@example.com";
pub const USER_PASSWORD: &str = "pass_word!";

pub fn codec() -> CredentialCodec {
    CredentialCodec::new(
        KindSettings {
            secret: ACCESS_SECRET,
            ttl: Duration::minutes(15),
        },
        KindSettings {
            secret: REFRESH_SECRET,
            ttl: Duration::days(7),
        },
    )
}

/// Test application that spawns a real server over an in-memory directory
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub user_service: Arc<UserService<InMemoryUserRepository>>,
    pub codec: CredentialCodec,
}

impl TestApp {
    /// Spawn the application in a background task, seeded with one admin
    /// and one regular account
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let authenticator = Arc::new(Authenticator::new(codec()));
        let user_service = Arc::new(UserService::new(Arc::clone(&repository)));
        let session_service = Arc::new(SessionService::new(authenticator, repository));

        user_service
            .ensure_admin(
                EmailAddress::new(ADMIN_EMAIL.to_string()).unwrap(),
                ADMIN_PASSWORD.to_string(),
            )
            .await
            .expect("Failed to seed admin");
        user_service
            .create_user(CreateUserCommand::new(
                EmailAddress::new(USER_EMAIL.to_string()).unwrap(),
                USER_PASSWORD.to_string(),
                Role::User,
            ))
            .await
            .expect("Failed to seed user");

        let router = create_router(session_service, user_service.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            user_service,
            codec: codec(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Log in and return the response body's `data` object
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// Log in as `email` and load the directory entry behind it
    pub async fn user_by_login(&self, email: &str, password: &str) -> User {
        let session = self.login(email, password).await;
        let id = UserId::from_string(session["user"]["id"].as_str().unwrap()).unwrap();
        self.user_service.get_user(&id).await.unwrap()
    }

    /// Mint an access credential for `user` that expired a minute ago
    pub fn expired_access_token(&self, user: &User) -> String {
        self.codec
            .issue_at(
                CredentialKind::Access,
                &user.identity(),
                Utc::now() - Duration::minutes(16),
            )
            .unwrap()
    }
}
