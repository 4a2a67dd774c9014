use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::PasswordReset;
use crate::domain::auth::models::RefreshSession;
use crate::domain::auth::ports::SessionStore;

/// Refresh sessions and password resets, one table each. Rows are never
/// deleted: sessions get `revoked_at`, resets get `used_at`.
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> AuthError {
    AuthError::Store(e.to_string())
}

#[derive(Debug, FromRow)]
struct RefreshSessionRow {
    id: i64,
    user_id: i64,
    token_hash: String,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<RefreshSessionRow> for RefreshSession {
    fn from(row: RefreshSessionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PasswordResetRow {
    id: i64,
    user_id: i64,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<PasswordResetRow> for PasswordReset {
    fn from(row: PasswordResetRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create_refresh_session(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AuthError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn find_active_refresh_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, AuthError> {
        let row = sqlx::query_as::<_, RefreshSessionRow>(
            "SELECT id, user_id, token_hash, expires_at, revoked_at, created_at \
             FROM refresh_tokens \
             WHERE token_hash = $1 AND revoked_at IS NULL \
             ORDER BY id DESC LIMIT 1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(RefreshSession::from))
    }

    async fn find_refresh_session(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, AuthError> {
        let row = sqlx::query_as::<_, RefreshSessionRow>(
            "SELECT id, user_id, token_hash, expires_at, revoked_at, created_at \
             FROM refresh_tokens \
             WHERE token_hash = $1 \
             ORDER BY id DESC LIMIT 1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(RefreshSession::from))
    }

    async fn revoke_refresh_session(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // Conditional update, not read-then-write: when two rotations race
        // on one session, exactly one of them flips the row.
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2 \
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn create_password_reset(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, AuthError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO password_resets (user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn find_unused_password_reset(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, AuthError> {
        let row = sqlx::query_as::<_, PasswordResetRow>(
            "SELECT id, user_id, token_hash, expires_at, used_at, created_at \
             FROM password_resets \
             WHERE token_hash = $1 AND used_at IS NULL \
             ORDER BY id DESC LIMIT 1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(PasswordReset::from))
    }

    async fn mark_password_reset_used(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE password_resets SET used_at = $2 \
             WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }
}
