use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::domain::auth::errors::AuthError;
use crate::domain::document::errors::DocumentError;
use crate::domain::link::errors::LinkError;
use crate::domain::user::errors::UserError;

pub mod auth;
pub mod documents;
pub mod links;
pub mod users;

/// Boundary error: every failure leaving the API has a status, a
/// dot-namespaced machine code and a safe human message, rendered as
/// `{"error": {"code", "message"}}`. Domain errors convert in one place
/// below; handlers never map statuses themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn unprocessable(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, code, message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// 500 with a generic body; the detail goes to the log only.
    fn internal(code: &'static str, detail: &str) -> Self {
        tracing::error!(code, detail, "internal error surfaced to client");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            "An error occurred while processing your request.",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::MissingToken => Self::unauthorized("auth.missing_token", message),
            AuthError::InvalidToken => Self::unauthorized("auth.invalid_token", message),
            AuthError::UserInactive => Self::unauthorized("auth.user_inactive", message),
            AuthError::InvalidCredentials => {
                Self::unauthorized("auth.invalid_credentials", message)
            }
            AuthError::MissingCredentials => Self::unprocessable("auth.missing_fields", message),
            AuthError::MissingRefresh => Self::unauthorized("auth.missing_refresh", message),
            AuthError::InvalidRefresh => Self::unauthorized("auth.invalid_refresh", message),
            AuthError::ExpiredRefresh => Self::unauthorized("auth.expired_refresh", message),
            AuthError::MissingEmail => Self::unprocessable("auth.missing_email", message),
            AuthError::InvalidResetRequest => Self::unprocessable("auth.reset_invalid", message),
            AuthError::InvalidResetToken => {
                Self::new(StatusCode::BAD_REQUEST, "auth.reset_invalid", message)
            }
            AuthError::ExpiredResetToken => {
                Self::new(StatusCode::BAD_REQUEST, "auth.reset_expired", message)
            }
            AuthError::UserNotFound => Self::not_found("auth.user_not_found", message),
            AuthError::MailSend(detail) => {
                tracing::error!(detail, "recovery mail delivery failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "mail.send_error",
                    "Failed to send recovery e-mail.",
                )
            }
            AuthError::Store(detail) => Self::internal("store.unavailable", &detail),
            AuthError::Internal(detail) => Self::internal("internal.error", &detail),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::Forbidden => Self::new(StatusCode::FORBIDDEN, "auth.forbidden", message),
            UserError::ForbiddenRole(_) => {
                Self::new(StatusCode::FORBIDDEN, "users.forbidden_role", message)
            }
            UserError::NotFound => Self::not_found("users.not_found", message),
            UserError::EmailExists => Self::unprocessable("users.email_exists", message),
            UserError::InvalidEmail(_) | UserError::Invalid(_) => {
                Self::unprocessable("users.invalid", message)
            }
            UserError::Hashing(detail) => Self::internal("internal.error", &detail),
            UserError::Database(detail) => Self::internal("store.unavailable", &detail),
        }
    }
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        let message = err.to_string();
        match err {
            LinkError::Forbidden => Self::new(StatusCode::FORBIDDEN, "auth.forbidden", message),
            LinkError::NotOwner => Self::new(StatusCode::FORBIDDEN, "links.forbidden", message),
            LinkError::BadNutritionist => Self::unprocessable("links.bad_nutri", message),
            LinkError::BadPatient => Self::unprocessable("links.bad_patient", message),
            LinkError::Database(detail) => Self::internal("store.unavailable", &detail),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        let message = err.to_string();
        match err {
            DocumentError::Forbidden => {
                Self::new(StatusCode::FORBIDDEN, "auth.forbidden", message)
            }
            DocumentError::NotOwner => {
                Self::new(StatusCode::FORBIDDEN, "docs.not_owner", message)
            }
            DocumentError::NotFound => Self::not_found("docs.not_found", message),
            DocumentError::NotAvailable => Self::not_found("docs.not_available", message),
            DocumentError::FileMissing => {
                Self::new(StatusCode::GONE, "docs.file_missing", message)
            }
            DocumentError::MissingFields => Self::unprocessable("docs.missing_fields", message),
            DocumentError::MissingPatients => {
                Self::unprocessable("docs.missing_patients", message)
            }
            DocumentError::Storage(detail) => Self::internal("docs.save_error", &detail),
            DocumentError::Database(detail) => Self::internal("store.unavailable", &detail),
        }
    }
}

/// Plain `{"message": ...}` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"data": ...}` wrapper for bare collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Data<T: Serialize> {
    pub data: T,
}

/// `{"id": ...}` body for 201 responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub id: i64,
}
