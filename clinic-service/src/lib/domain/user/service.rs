use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;

use crate::domain::auth::models::Principal;
use crate::domain::paging;
use crate::domain::paging::Page;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::CreateUser;
use crate::domain::user::models::NewUserRecord;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateProfile;
use crate::domain::user::models::UpdateUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserDetail;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::UserSummary;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;

const MIN_NAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Account management with the practice's role rules: masters manage
/// everyone, nutritionists manage only patients, patients only their own
/// profile.
pub struct UserService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: PasswordHasher,
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Can `principal` manage an account of role `target`?
    fn ensure_can_manage(&self, principal: &Principal, target: Role) -> Result<(), UserError> {
        match principal.role {
            Role::Master => Ok(()),
            Role::Nutritionist if target == Role::Patient => Ok(()),
            Role::Nutritionist => Err(UserError::ForbiddenRole(
                "Nutritionists may only manage patients.".to_string(),
            )),
            Role::Patient => Err(UserError::Forbidden),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        self.password_hasher
            .hash(password)
            .map_err(|e| UserError::Hashing(e.to_string()))
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i64>) -> Result<(), UserError> {
        if let Some(existing) = self.repository.find_by_email(email).await? {
            if Some(existing.id) != except {
                return Err(UserError::EmailExists);
            }
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)
    }
}

#[async_trait]
impl<R> UserServicePort for UserService<R>
where
    R: UserRepository,
{
    async fn list(
        &self,
        principal: &Principal,
        mut filter: UserFilter,
    ) -> Result<Page<UserSummary>, UserError> {
        match principal.role {
            Role::Master => {}
            // Nutritionists see the patient roster only, whatever the
            // requested role filter says.
            Role::Nutritionist => filter.role = Some(Role::Patient),
            Role::Patient => return Err(UserError::Forbidden),
        }

        let (page, per_page) = paging::clamp(filter.page, filter.per_page);
        filter.page = page;
        filter.per_page = per_page;

        let users = self.repository.list(&filter).await?;
        Ok(users.map(|u| UserSummary::from(&u)))
    }

    async fn create(&self, principal: &Principal, command: CreateUser) -> Result<i64, UserError> {
        self.ensure_can_manage(principal, command.role)?;

        if command.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(UserError::Invalid(format!(
                "Name must have at least {} characters.",
                MIN_NAME_LEN
            )));
        }
        if command.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::Invalid(format!(
                "Password must have at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }

        self.ensure_email_free(command.email.as_str(), None).await?;

        let password_hash = self.hash_password(&command.password)?;
        let user = self
            .repository
            .create(NewUserRecord {
                name: command.name.trim().to_string(),
                email: command.email,
                password_hash,
                role: command.role,
                status: UserStatus::Active,
                photo_url: command.photo_url,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "user created");

        Ok(user.id)
    }

    async fn get(&self, principal: &Principal, id: i64) -> Result<UserDetail, UserError> {
        let user = self.load(id).await?;
        self.ensure_can_manage(principal, user.role)?;
        Ok(UserDetail::from(&user))
    }

    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        command: UpdateUser,
    ) -> Result<(), UserError> {
        let mut user = self.load(id).await?;
        self.ensure_can_manage(principal, user.role)?;

        if let Some(email) = command.email {
            if email.as_str() != user.email {
                self.ensure_email_free(email.as_str(), Some(id)).await?;
                user.email = email.into_string();
            }
        }
        if let Some(name) = command.name {
            user.name = name;
        }
        if let Some(password) = command.password {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(UserError::Invalid(format!(
                    "Password must have at least {} characters.",
                    MIN_PASSWORD_LEN
                )));
            }
            user.password_hash = self.hash_password(&password)?;
        }
        if let Some(photo_url) = command.photo_url {
            user.photo_url = Some(photo_url);
        }
        if let Some(status) = command.status {
            user.status = status;
        }

        self.repository.update(&user).await
    }

    async fn toggle_status(
        &self,
        principal: &Principal,
        id: i64,
    ) -> Result<UserStatus, UserError> {
        let mut user = self.load(id).await?;
        self.ensure_can_manage(principal, user.role)?;

        user.status = user.status.toggled();
        self.repository.update(&user).await?;

        Ok(user.status)
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), UserError> {
        let user = self.load(id).await?;
        self.ensure_can_manage(principal, user.role)?;
        self.repository.delete(user.id).await
    }

    async fn update_self(
        &self,
        principal: &Principal,
        command: UpdateProfile,
    ) -> Result<(), UserError> {
        // Self-edit is the ownership predicate in its simplest form:
        // everyone owns their own profile, role and status stay untouched.
        let mut user = self.load(principal.user_id).await?;

        if let Some(email) = command.email {
            if email.as_str() != user.email {
                self.ensure_email_free(email.as_str(), Some(user.id)).await?;
                user.email = email.into_string();
            }
        }
        if let Some(name) = command.name {
            user.name = name;
        }
        if let Some(password) = command.password {
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(UserError::Invalid(format!(
                    "Password must have at least {} characters.",
                    MIN_PASSWORD_LEN
                )));
            }
            user.password_hash = self.hash_password(&password)?;
        }
        if let Some(photo_url) = command.photo_url {
            user.photo_url = Some(photo_url);
        }

        self.repository.update(&user).await
    }
}
