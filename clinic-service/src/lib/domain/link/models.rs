use serde::Serialize;

use crate::domain::user::models::UserStatus;

/// Patient row as listed in a nutritionist's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedPatient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub photo_url: Option<String>,
}

/// Whether an attach created a link or found it already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Created,
    AlreadyLinked,
}
