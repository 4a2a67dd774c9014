use std::sync::Arc;

use async_trait::async_trait;
use auth::token;
use auth::AccessClaims;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::UserClaim;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::Principal;
use crate::domain::auth::models::RefreshOutcome;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::Clock;
use crate::domain::auth::ports::Mailer;
use crate::domain::auth::ports::SessionStore;
use crate::domain::user::models::User;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::UserSummary;
use crate::domain::user::ports::UserRepository;

/// Opaque refresh/reset tokens: 64 random bytes, 128 hex characters.
const OPAQUE_TOKEN_BYTES: usize = 64;

const MIN_PASSWORD_LEN: usize = 6;

/// Auth-flow tunables resolved from configuration at startup.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub token_pepper: Option<String>,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_days: i64,
    pub reset_token_ttl_minutes: i64,
    pub reset_link_url: String,
}

/// Orchestrates login, refresh rotation, logout and the password-reset
/// lifecycle. Holds no per-request state; everything flows through the
/// injected store, mailer and clock.
pub struct AuthService<S, U, M, C>
where
    S: SessionStore,
    U: UserRepository,
    M: Mailer,
    C: Clock,
{
    sessions: Arc<S>,
    users: Arc<U>,
    mailer: Arc<M>,
    clock: Arc<C>,
    jwt: JwtHandler,
    passwords: PasswordHasher,
    settings: AuthSettings,
}

impl<S, U, M, C> AuthService<S, U, M, C>
where
    S: SessionStore,
    U: UserRepository,
    M: Mailer,
    C: Clock,
{
    pub fn new(
        sessions: Arc<S>,
        users: Arc<U>,
        mailer: Arc<M>,
        clock: Arc<C>,
        signing_secret: &[u8],
        settings: AuthSettings,
    ) -> Self {
        Self {
            sessions,
            users,
            mailer,
            clock,
            jwt: JwtHandler::new(signing_secret),
            passwords: PasswordHasher::new(),
            settings,
        }
    }

    fn pepper(&self) -> Option<&str> {
        self.settings.token_pepper.as_deref()
    }

    fn hash_opaque(&self, plaintext: &str) -> String {
        token::hash(plaintext, self.pepper())
    }

    /// Fresh opaque token: plaintext for the client, hash for the store.
    fn mint_opaque(&self) -> (String, String) {
        let plaintext = token::generate(OPAQUE_TOKEN_BYTES);
        let hash = self.hash_opaque(&plaintext);
        (plaintext, hash)
    }

    fn issue_access_token(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AccessClaims::issue(
            self.settings.issuer.clone(),
            user.id,
            user.role.as_str(),
            UserClaim {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
            },
            now,
            self.settings.access_token_ttl_secs,
        );
        self.jwt
            .encode(&claims)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn open_session(&self, user_id: i64, now: DateTime<Utc>) -> Result<String, AuthError> {
        let (plaintext, hash) = self.mint_opaque();
        let expires_at = now + Duration::days(self.settings.refresh_token_ttl_days);
        self.sessions
            .create_refresh_session(user_id, &hash, expires_at)
            .await?;
        Ok(plaintext)
    }

    fn reset_link(&self, token_plaintext: &str) -> String {
        let base = &self.settings.reset_link_url;
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", base, separator, token_plaintext)
    }
}

#[async_trait]
impl<S, U, M, C> AuthServicePort for AuthService<S, U, M, C>
where
    S: SessionStore,
    U: UserRepository,
    M: Mailer,
    C: Clock,
{
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self.users.find_by_email(email).await?;

        let Some(user) = user else {
            // Burn the same hashing work as a real verification so an
            // unknown e-mail answers in the same time as a wrong password.
            let _ = self.passwords.hash(password);
            return Err(AuthError::InvalidCredentials);
        };

        let verified = self
            .passwords
            .verify(password, &user.password_hash)
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = user.id, error = %e, "stored password hash unreadable");
                false
            });
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        if user.status != UserStatus::Active {
            return Err(AuthError::UserInactive);
        }

        let now = self.clock.now();
        let access_token = self.issue_access_token(&user, now)?;
        let refresh_token = self.open_session(user.id, now).await?;

        tracing::info!(user_id = user.id, "login succeeded");

        Ok(LoginOutcome {
            access_token,
            expires_in: self.settings.access_token_ttl_secs,
            refresh_token,
            user: UserSummary::from(&user),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::MissingRefresh);
        }

        let hash = self.hash_opaque(refresh_token);
        let session = self
            .sessions
            .find_active_refresh_session(&hash)
            .await?
            .ok_or(AuthError::InvalidRefresh)?;

        let now = self.clock.now();
        // Expired rows stay unrevoked; the time gate alone makes them dead.
        if session.expires_at <= now {
            return Err(AuthError::ExpiredRefresh);
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .filter(|u| u.status == UserStatus::Active)
            .ok_or(AuthError::UserInactive)?;

        // Single-use rotation. The conditional revoke is the serialization
        // point: of two requests racing on the same token, the loser sees
        // the row already revoked and fails like any reused token.
        if !self.sessions.revoke_refresh_session(session.id, now).await? {
            return Err(AuthError::InvalidRefresh);
        }

        let access_token = self.issue_access_token(&user, now)?;
        let refresh_token = self.open_session(user.id, now).await?;

        tracing::debug!(user_id = user.id, session_id = session.id, "refresh token rotated");

        Ok(RefreshOutcome {
            access_token,
            expires_in: self.settings.access_token_ttl_secs,
            refresh_token,
        })
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::MissingRefresh);
        }

        let hash = self.hash_opaque(refresh_token);
        // Succeed whether or not the token matched anything: the response
        // must not reveal session validity.
        if let Some(session) = self.sessions.find_refresh_session(&hash).await? {
            let _ = self
                .sessions
                .revoke_refresh_session(session.id, self.clock.now())
                .await?;
        }

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }

        // Unknown e-mail: same outcome as success, nothing persisted.
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(());
        };

        let now = self.clock.now();
        let (plaintext, hash) = self.mint_opaque();
        let expires_at = now + Duration::minutes(self.settings.reset_token_ttl_minutes);
        self.sessions
            .create_password_reset(user.id, &hash, expires_at)
            .await?;

        let link = self.reset_link(&plaintext);
        let body = format!(
            "<p>Hello, {name},</p>\
             <p>We received a request to reset your password. \
             The link below is valid until {expires}:</p>\
             <p><a href=\"{link}\">{link}</a></p>\
             <p>If you did not request this, you can ignore this message.</p>",
            name = user.name,
            expires = expires_at.format("%Y-%m-%d %H:%M UTC"),
            link = link,
        );

        self.mailer
            .send(&user.email, "Password reset", &body)
            .await
            .map_err(|e| {
                tracing::error!(user_id = user.id, error = %e, "reset mail delivery failed");
                AuthError::MailSend(e.to_string())
            })
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        if token.is_empty() || new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidResetRequest);
        }

        let hash = self.hash_opaque(token);
        let reset = self
            .sessions
            .find_unused_password_reset(&hash)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let now = self.clock.now();
        if reset.expires_at <= now {
            return Err(AuthError::ExpiredResetToken);
        }

        let mut user = self
            .users
            .find_by_id(reset.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.password_hash = self
            .passwords
            .hash(new_password)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        self.users.update(&user).await?;

        self.sessions.mark_password_reset_used(reset.id, now).await?;

        tracing::info!(user_id = user.id, "password reset completed");

        Ok(())
    }

    async fn current_user(&self, principal: &Principal) -> Result<UserSummary, AuthError> {
        let user = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(UserSummary::from(&user))
    }
}
