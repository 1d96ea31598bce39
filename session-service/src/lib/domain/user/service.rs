use std::sync::Arc;

use async_trait::async_trait;
use auth::Role;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service for directory administration.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            role: command.role,
            active: true,
            password_hash,
            refresh_token: None,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            role = %created_user.role,
            "User created"
        );

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn set_user_active(&self, id: &UserId, active: bool) -> Result<User, UserError> {
        let user = self.repository.set_active(id, active).await?;

        if !active {
            self.repository.set_refresh_token(id, None).await?;
        }

        tracing::info!(user_id = %id, active, "User activation changed");
        Ok(user)
    }

    async fn ensure_admin(
        &self,
        email: EmailAddress,
        password: String,
    ) -> Result<bool, UserError> {
        if self.repository.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }

        self.create_user(CreateUserCommand::new(email, password, Role::Admin))
            .await?;
        Ok(true)
    }
}
