use async_trait::async_trait;

use crate::domain::auth::models::Principal;
use crate::domain::paging::Page;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::CreateUser;
use crate::domain::user::models::NewUserRecord;
use crate::domain::user::models::UpdateProfile;
use crate::domain::user::models::UpdateUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserDetail;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::UserSummary;

/// User account operations, already scoped to the acting principal.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// List accounts. Masters see everyone, nutritionists only patients,
    /// patients are refused.
    async fn list(
        &self,
        principal: &Principal,
        filter: UserFilter,
    ) -> Result<Page<UserSummary>, UserError>;

    /// Create an account. Masters may create any role; nutritionists only
    /// patients.
    ///
    /// # Errors
    /// * `Forbidden` / `ForbiddenRole` - role rules refused the action
    /// * `EmailExists` - another account holds this e-mail
    async fn create(&self, principal: &Principal, command: CreateUser) -> Result<i64, UserError>;

    /// Fetch one account, applying the same visibility rules as `list`.
    async fn get(&self, principal: &Principal, id: i64) -> Result<UserDetail, UserError>;

    /// Partially update an account.
    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        command: UpdateUser,
    ) -> Result<(), UserError>;

    /// Flip active/inactive and return the new status.
    async fn toggle_status(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<UserStatus, UserError>;

    /// Hard-delete an account.
    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), UserError>;

    /// Update the acting user's own profile (never role or status).
    async fn update_self(
        &self,
        principal: &Principal,
        command: UpdateProfile,
    ) -> Result<(), UserError>;
}

/// Persistence operations for user accounts.
///
/// Reads never return soft-deleted rows.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new account.
    ///
    /// # Errors
    /// * `EmailExists` - unique e-mail constraint violated
    /// * `Database` - store failure
    async fn create(&self, record: NewUserRecord) -> Result<User, UserError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserError>;

    /// Lookup by e-mail exactly as submitted (rows store lowercase).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    async fn list(&self, filter: &UserFilter) -> Result<Page<User>, UserError>;

    /// Write back a full row (name, email, password hash, role, status,
    /// photo). Zero rows touched means the account is gone.
    async fn update(&self, user: &User) -> Result<(), UserError>;

    async fn delete(&self, id: i64) -> Result<(), UserError>;
}
