use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::router::AppState;

/// Drop the caller's refresh credential. Calling it twice is harmless.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    state
        .session_service
        .logout(&user)
        .await
        .map_err(ApiError::from)
        .map(|_| StatusCode::NO_CONTENT)
}
