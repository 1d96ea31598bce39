use auth::Role;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::session::guard::extract_bearer;
use crate::domain::session::guard::require_role;
use crate::domain::session::models::AuthenticatedUser;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that runs the session guard and adds the caller to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let bearer = extract_bearer(
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    )
    .map(str::to_owned);

    let user = state
        .session_service
        .authorize(bearer.as_deref())
        .await
        .map_err(|e| {
            match e.code() {
                Some(code) => tracing::warn!(code = %code, uri = %req.uri(), "Request rejected: {}", e),
                None => tracing::error!(error = %e, "Session guard failed"),
            }
            ApiError::from(e).into_response()
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Middleware layered after `authenticate` on admin-only routes
pub async fn require_admin(req: Request, next: Next) -> Result<Response, Response> {
    let user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::InternalServerError("missing caller identity".to_string()))
        .map_err(IntoResponse::into_response)?;

    require_role(user, Role::Admin).map_err(|e| {
        tracing::warn!(user_id = %user.id, code = "FORBIDDEN_ROLE", "Request rejected: {}", e);
        ApiError::from(e).into_response()
    })?;

    Ok(next.run(req).await)
}
