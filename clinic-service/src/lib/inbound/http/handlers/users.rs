use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::auth::models::Principal;
use crate::domain::paging;
use crate::domain::paging::Page;
use crate::domain::user::models::CreateUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateProfile;
use crate::domain::user::models::UpdateUser;
use crate::domain::user::models::UserDetail;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::UserSummary;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::Created;
use crate::inbound::http::handlers::Message;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersQuery {
    q: Option<String>,
    status: Option<UserStatus>,
    role: Option<Role>,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    paging::DEFAULT_PER_PAGE
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Page<UserSummary>>, ApiError> {
    let filter = UserFilter {
        q: query.q.filter(|q| !q.trim().is_empty()),
        status: query.status,
        role: query.role,
        page: query.page,
        per_page: query.per_page,
    };
    let page = state.user_service.list(&principal, filter).await?;
    Ok(Json(page))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    name: String,
    email: String,
    role: Role,
    password: String,
    photo_url: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let command = CreateUser {
        name: body.name,
        email: EmailAddress::new(&body.email).map_err(crate::domain::user::errors::UserError::from)?,
        password: body.password,
        role: body.role,
        photo_url: body.photo_url,
    };
    let id = state.user_service.create(&principal, command).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn show(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<UserDetail>, ApiError> {
    let user = state.user_service.get(&principal, id).await?;
    Ok(Json(user))
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    photo_url: Option<String>,
    status: Option<UserStatus>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUser, ApiError> {
        let email = self
            .email
            .map(|e| EmailAddress::new(&e))
            .transpose()
            .map_err(crate::domain::user::errors::UserError::from)?;
        Ok(UpdateUser {
            name: self.name,
            email,
            password: self.password.filter(|p| !p.is_empty()),
            photo_url: self.photo_url,
            status: self.status,
        })
    }
}

pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<Message>, ApiError> {
    let command = body.try_into_command()?;
    state.user_service.update(&principal, id, command).await?;
    Ok(Json(Message::new("Updated.")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    pub status: UserStatus,
}

pub async fn toggle_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<StatusBody>, ApiError> {
    let status = state.user_service.toggle_status(&principal, id).await?;
    Ok(Json(StatusBody { status }))
}

pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    state.user_service.delete(&principal, id).await?;
    Ok(Json(Message::new("Deleted.")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    photo_url: Option<String>,
}

pub async fn update_self(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Message>, ApiError> {
    let email = body
        .email
        .map(|e| EmailAddress::new(&e))
        .transpose()
        .map_err(crate::domain::user::errors::UserError::from)?;
    let command = UpdateProfile {
        name: body.name,
        email,
        password: body.password.filter(|p| !p.is_empty()),
        photo_url: body.photo_url,
    };
    state.user_service.update_self(&principal, command).await?;
    Ok(Json(Message::new("Profile updated.")))
}
