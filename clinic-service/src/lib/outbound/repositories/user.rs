use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::QueryBuilder;

use crate::domain::paging::Page;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::NewUserRecord;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::ports::UserRepository;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, status, photo_url, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, UserError> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self
                .role
                .parse()
                .map_err(|e: String| UserError::Database(format!("corrupt users row: {}", e)))?,
            status: self
                .status
                .parse()
                .map_err(|e: String| UserError::Database(format!("corrupt users row: {}", e)))?,
            photo_url: self.photo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn map_unique_violation(e: sqlx::Error) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return UserError::EmailExists;
        }
    }
    UserError::Database(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, record: NewUserRecord) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash, role, status, photo_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, name, email, password_hash, role, status, photo_url, created_at, updated_at",
        )
        .bind(&record.name)
        .bind(record.email.as_str())
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.status.as_str())
        .bind(&record.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.into_user()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Database(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, UserError> {
        fn push_filters<'a>(builder: &mut QueryBuilder<'a, sqlx::Postgres>, filter: &'a UserFilter) {
            if let Some(q) = &filter.q {
                let pattern = format!("%{}%", q);
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR email ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(status) = filter.status {
                builder.push(" AND status = ").push_bind(status.as_str());
            }
            if let Some(role) = filter.role {
                builder.push(" AND role = ").push_bind(role.as_str());
            }
        }

        let mut count_builder =
            QueryBuilder::new("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL");
        push_filters(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM users WHERE deleted_at IS NULL",
            USER_COLUMNS
        ));
        push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(filter.per_page)
            .push(" OFFSET ")
            .push_bind((filter.page - 1) * filter.per_page);

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(users, filter.page, filter.per_page, total))
    }

    async fn update(&self, user: &User) -> Result<(), UserError> {
        let result = sqlx::query(
            "UPDATE users \
             SET name = $2, email = $3, password_hash = $4, role = $5, status = $6, \
                 photo_url = $7, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(&user.photo_url)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }
}
