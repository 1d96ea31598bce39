//! Client half of the session lifecycle.
//!
//! [`SessionContext`] is the entry point: it logs in, keeps the credential
//! pair in a [`CredentialStore`] and sends every protected call through the
//! [`Gateway`], which turns a `TOKEN_EXPIRED` rejection into exactly one
//! refresh shared by all concurrent callers, then replays each call once.
//!
//! ```no_run
//! use session_client::ClientConfig;
//! use session_client::SessionContext;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load("session-client")?;
//! let session = SessionContext::connect(&config)?;
//!
//! session.login("admin@example.com", "admin-password").await?;
//! let me = session.restore().await?;
//! println!("signed in as {:?}", me.map(|user| user.email));
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
pub mod endpoints;
mod errors;
mod gateway;
mod models;
mod store;
mod transport;

pub use auth::AuthErrorCode;
pub use config::ClientConfig;
pub use context::SessionContext;
pub use errors::GatewayError;
pub use errors::LoginError;
pub use errors::TransportError;
pub use gateway::Gateway;
pub use gateway::RefreshCoordinator;
pub use gateway::SessionEvent;
pub use models::AccessToken;
pub use models::ApiRequest;
pub use models::ApiResponse;
pub use models::RefreshToken;
pub use models::SessionUser;
pub use models::StoredSession;
pub use store::CredentialStore;
pub use store::FileCredentialStore;
pub use store::MemoryCredentialStore;
pub use transport::HttpTransport;
pub use transport::Transport;
