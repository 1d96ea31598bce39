use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user directory administration.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create a new account with a hashed password.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Activate or deactivate an account.
    ///
    /// Deactivating also drops the account's stored refresh credential.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_user_active(&self, id: &UserId, active: bool) -> Result<User, UserError>;

    /// Create the bootstrap administrator unless the email is already taken.
    ///
    /// # Returns
    /// `true` when an account was created
    async fn ensure_admin(&self, email: EmailAddress, password: String)
        -> Result<bool, UserError>;
}

/// Persistence operations for the user directory.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier; `None` when absent.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address; `None` when absent.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Replace the stored refresh credential (`None` clears it).
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn set_refresh_token(
        &self,
        id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<(), UserError>;

    /// Flip the active flag.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn set_active(&self, id: &UserId, active: bool) -> Result<User, UserError>;
}
