use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::Role;
use crate::domain::user::models::UserSummary;

/// Resolved identity of the current request, derived from a verified
/// access token by the authentication middleware. Immutable for the
/// request's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

impl Principal {
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    /// The ownership predicate shared by every owned resource: masters
    /// act on anything; otherwise the actor must hold the owning role
    /// and be the owner. Documents (nutritionist uploader), link
    /// management (the nutritionist themself) and profile self-edit all
    /// go through here rather than re-deriving the rule per endpoint.
    pub fn can_act_for(&self, owner_role: Role, owner_id: i64) -> bool {
        self.role == Role::Master || (self.role == owner_role && self.user_id == owner_id)
    }
}

/// One login session. The plaintext refresh token is returned to the
/// client exactly once; rows only ever hold its hash.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One password-reset request; single-use, marked used on success.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Successful login: bearer credentials plus the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: UserSummary,
}

/// Successful rotation: fresh bearer credentials, old session revoked.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: String,
}
