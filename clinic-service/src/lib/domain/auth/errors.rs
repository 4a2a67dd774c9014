use thiserror::Error;

use crate::domain::user::errors::UserError;

/// Failures of the authentication flows and of per-request
/// authentication.
///
/// Messages are deliberately generic: login and forgot-password
/// collapse distinguishable internal causes into one external answer so
/// responses cannot be used to enumerate accounts.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing token.")]
    MissingToken,

    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("User inactive or missing.")]
    UserInactive,

    #[error("Invalid e-mail or password.")]
    InvalidCredentials,

    #[error("E-mail and password are required.")]
    MissingCredentials,

    #[error("Missing refresh token.")]
    MissingRefresh,

    #[error("Invalid refresh token.")]
    InvalidRefresh,

    #[error("Refresh token expired.")]
    ExpiredRefresh,

    #[error("E-mail is required.")]
    MissingEmail,

    #[error("Token and new password (min. 6 chars) are required.")]
    InvalidResetRequest,

    #[error("Invalid token.")]
    InvalidResetToken,

    #[error("Token expired.")]
    ExpiredResetToken,

    #[error("User not found.")]
    UserNotFound,

    #[error("Failed to send recovery e-mail.")]
    MailSend(String),

    #[error("Store unavailable: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        AuthError::Store(err.to_string())
    }
}
