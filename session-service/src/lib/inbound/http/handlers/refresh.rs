use auth::TokenPair;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::errors::GuardError;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::router::AppState;

/// Exchange a refresh credential for a new pair. Public route: the access
/// credential is usually expired by the time this is called.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<ApiSuccess<TokenPair>, ApiError> {
    let refresh_token = body
        .refresh_token
        .filter(|token| !token.trim().is_empty())
        .ok_or(ApiError::from(GuardError::NoToken))?;

    state
        .session_service
        .refresh(&refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|tokens| ApiSuccess::new(StatusCode::OK, tokens))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: Option<String>,
}
