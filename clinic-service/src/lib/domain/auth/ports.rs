use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::PasswordReset;
use crate::domain::auth::models::Principal;
use crate::domain::auth::models::RefreshOutcome;
use crate::domain::auth::models::RefreshSession;
use crate::domain::user::models::UserSummary;

/// Authentication flows exposed to the HTTP layer.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Exchange a refresh token for fresh credentials. Single-use: the
    /// consumed session is revoked and a new one created.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, AuthError>;

    /// Revoke the session matching this refresh token. Succeeds whether
    /// or not a matching session exists.
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Start a password reset. Succeeds for unknown e-mails too; only a
    /// genuine mail-delivery failure for an existing account surfaces.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Profile of the authenticated user.
    async fn current_user(&self, principal: &Principal) -> Result<UserSummary, AuthError>;
}

/// Persistence for refresh sessions and password resets.
///
/// Expiry is always checked by the caller against its injected clock;
/// the store only distinguishes revoked/used rows.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn create_refresh_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AuthError>;

    /// Only sessions that have not been revoked.
    async fn find_active_refresh_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, AuthError>;

    /// Any session, revoked or not (logout does not care).
    async fn find_refresh_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, AuthError>;

    /// Conditionally set `revoked_at`; returns whether this call did the
    /// revocation. Two racing consumers of the same refresh token both
    /// land here and exactly one sees `true` — the store must guard the
    /// update with `revoked_at IS NULL` (or equivalent), not read-then-write.
    async fn revoke_refresh_session(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    async fn create_password_reset(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AuthError>;

    /// Only resets that have not been used.
    async fn find_unused_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, AuthError>;

    /// Idempotent.
    async fn mark_password_reset_used(&self, id: i64, at: DateTime<Utc>)
        -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MailError(pub String);

/// Outbound mail delivery; only the forgot-password flow sends.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// Injected time source so every expiry computation is testable.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}
