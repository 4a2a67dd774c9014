use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Access denied.")]
    Forbidden,

    /// Role rules of the acting user forbid touching this target
    /// (a nutritionist acting on anything but a patient).
    #[error("{0}")]
    ForbiddenRole(String),

    #[error("User not found.")]
    NotFound,

    #[error("E-mail already in use.")]
    EmailExists,

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    Invalid(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),
}
