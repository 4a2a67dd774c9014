use thiserror::Error;

use crate::domain::user::errors::UserError;

#[derive(Debug, Clone, Error)]
pub enum LinkError {
    #[error("Access denied.")]
    Forbidden,

    /// A nutritionist touching another nutritionist's roster.
    #[error("You may only manage your own patient links.")]
    NotOwner,

    #[error("Invalid nutritionist.")]
    BadNutritionist,

    #[error("Invalid patient.")]
    BadPatient,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<UserError> for LinkError {
    fn from(err: UserError) -> Self {
        LinkError::Database(err.to_string())
    }
}
