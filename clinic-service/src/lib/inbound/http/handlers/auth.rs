use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::Principal;
use crate::domain::auth::models::RefreshOutcome;
use crate::domain::user::models::UserSummary;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::Message;
use crate::inbound::http::router::AppState;

/// Returned for forgot-password whether or not the account exists.
const RESET_NOTICE: &str = "If the e-mail exists, we will send instructions.";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let outcome = state.auth_service.login(&body.email, &body.password).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: String,
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshOutcome>, ApiError> {
    let outcome = state.auth_service.refresh(&body.refresh_token).await?;
    Ok(Json(outcome))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<Message>, ApiError> {
    state.auth_service.logout(&body.refresh_token).await?;
    Ok(Json(Message::new("Session closed.")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<Message>, ApiError> {
    state.auth_service.forgot_password(&body.email).await?;
    Ok(Json(Message::new(RESET_NOTICE)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    token: String,
    #[serde(default)]
    new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<Message>, ApiError> {
    state
        .auth_service
        .reset_password(&body.token, &body.new_password)
        .await?;
    Ok(Json(Message::new("Password changed successfully.")))
}

pub async fn me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<UserSummary>, ApiError> {
    let user = state.auth_service.current_user(&principal).await?;
    Ok(Json(user))
}
