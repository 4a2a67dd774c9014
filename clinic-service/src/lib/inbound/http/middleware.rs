use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::auth::models::Principal;
use crate::domain::user::models::UserStatus;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Per-request authentication: verify the bearer token, reload the user
/// and check it is still active, then attach the resolved [`Principal`]
/// to the request extensions — the only mutation this layer performs.
/// Handlers receive the principal through its extractor.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;

    let claims = state.jwt.decode(token).map_err(|e| {
        tracing::debug!(error = %e, "access token rejected");
        ApiError::unauthorized("auth.invalid_token", "Invalid or expired token.")
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| ApiError::unauthorized("auth.invalid_token", "Invalid or expired token."))?;

    // The token proves who the caller was at issuance; the account must
    // still exist and be active right now.
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .filter(|u| u.status == UserStatus::Active)
        .ok_or_else(|| {
            ApiError::unauthorized("auth.user_inactive", "User inactive or missing.")
        })?;

    request.extensions_mut().insert(Principal {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("auth.missing_token", "Missing token."))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("auth.missing_token", "Missing token."))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::unauthorized("auth.missing_token", "Missing token.")),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().copied().ok_or_else(|| {
            ApiError::unauthorized("auth.unauthenticated", "Not authenticated.")
        })
    }
}
