use std::sync::Arc;

use auth::AuthErrorCode;
use auth::TokenPair;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::instrument;

use crate::endpoints;
use crate::errors::GatewayError;
use crate::models::AccessToken;
use crate::models::ApiRequest;
use crate::models::ApiResponse;
use crate::models::RefreshToken;
use crate::models::SessionUser;
use crate::store::CredentialStore;
use crate::transport::Transport;

mod coordinator;

pub use coordinator::RefreshCoordinator;
use coordinator::Ticket;

const EVENT_CAPACITY: usize = 16;

/// Session lifecycle notifications for whoever renders the signed-in state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(SessionUser),
    Refreshed,
    SignedOut,
    /// The session ended without the user asking for it.
    Terminated { reason: String },
}

enum RefreshFailure {
    /// The service refused the refresh credential.
    Refused(String),
    /// No answer; says nothing about the credentials.
    Unreachable(GatewayError),
}

/// Sends calls with the current access credential and recovers from
/// `TOKEN_EXPIRED` with one shared refresh and a single retry.
pub struct Gateway<T: Transport> {
    transport: T,
    store: Arc<dyn CredentialStore>,
    coordinator: RefreshCoordinator,
    events: broadcast::Sender<SessionEvent>,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T, store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            store,
            coordinator: RefreshCoordinator::new(),
            events,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Clear the stored session and announce it, once per session.
    pub(crate) fn end_session(&self, reason: &str) -> bool {
        if self.store.take().is_some() {
            tracing::warn!(reason, "Session terminated");
            self.publish(SessionEvent::Terminated {
                reason: reason.to_string(),
            });
            true
        } else {
            false
        }
    }

    /// Send `request` with the stored access credential.
    ///
    /// Responses are returned as-is unless they carry `TOKEN_EXPIRED`; then the
    /// call waits for (or runs) the shared refresh and is retried exactly once.
    /// The retried response is returned as-is even if it is another rejection.
    ///
    /// # Errors
    /// * `Transport` - No response; nothing is refreshed or cleared
    /// * `SessionExpired` - Refresh was refused and the session cleared
    /// * `RefreshAbandoned` - The refreshing call was dropped mid-flight
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        let sent_with = self.store.get().map(|session| session.access_token);
        let response = self
            .transport
            .send(request, sent_with.as_ref().map(AccessToken::as_str))
            .await?;

        if response.auth_error_code() != Some(AuthErrorCode::TokenExpired) {
            return Ok(response);
        }

        tracing::debug!("Access credential expired");
        let token = self.renewed_token(sent_with.as_ref()).await?;

        Ok(self.transport.send(request, Some(token.as_str())).await?)
    }

    async fn renewed_token(
        &self,
        sent_with: Option<&AccessToken>,
    ) -> Result<AccessToken, GatewayError> {
        let ticket = self.coordinator.join(sent_with, || {
            self.store.get().map(|session| session.access_token)
        });

        match ticket {
            Ticket::Fresh(token) => {
                tracing::debug!("Credential already renewed, retrying");
                Ok(token)
            }
            Ticket::Ended => Err(GatewayError::SessionExpired(
                "no session to refresh".to_string(),
            )),
            Ticket::Waiter(receiver) => {
                tracing::debug!("Waiting for in-flight refresh");
                receiver
                    .await
                    .unwrap_or(Err(GatewayError::RefreshAbandoned))
            }
            Ticket::Leader(leader) => {
                tracing::debug!("Refreshing session");
                match self.refresh().await {
                    Ok(token) => {
                        let released = leader.settle(Ok(token.clone()));
                        tracing::info!(released, "Session refreshed");
                        self.publish(SessionEvent::Refreshed);
                        Ok(token)
                    }
                    Err(RefreshFailure::Unreachable(error)) => {
                        leader.settle(Err(error.clone()));
                        tracing::warn!(error = %error, "Refresh endpoint unreachable");
                        Err(error)
                    }
                    Err(RefreshFailure::Refused(reason)) => {
                        let error = GatewayError::SessionExpired(reason.clone());
                        leader.settle(Err(error.clone()));
                        self.end_session(&reason);
                        Err(error)
                    }
                }
            }
        }
    }

    /// Trade the stored refresh credential for a new pair and persist it.
    async fn refresh(&self) -> Result<AccessToken, RefreshFailure> {
        let session = self
            .store
            .get()
            .ok_or_else(|| RefreshFailure::Refused("no session to refresh".to_string()))?;

        let request = ApiRequest::post(
            endpoints::REFRESH,
            Some(json!({ "refreshToken": session.refresh_token.as_str() })),
        );
        let response = self
            .transport
            .send(&request, None)
            .await
            .map_err(|e| RefreshFailure::Unreachable(e.into()))?;

        if !response.is_success() {
            return Err(RefreshFailure::Refused(response.message()));
        }

        let pair: TokenPair = response
            .data()
            .map_err(|e| RefreshFailure::Unreachable(e.into()))?;
        let access_token = AccessToken::new(pair.access_token);

        // A logout that landed while the refresh was in flight wins.
        let rotated = session.rotated(access_token.clone(), RefreshToken::new(pair.refresh_token));
        if !self.store.replace_if_present(rotated) {
            return Err(RefreshFailure::Refused("signed out during refresh".to_string()));
        }

        Ok(access_token)
    }
}
