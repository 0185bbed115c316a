//! User repository trait defining the interface for user persistence.
//!
//! Implementations run against whatever executor their unit of work was
//! built with, so every call made through one transaction scope sees that
//! transaction's writes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// # Example
/// ```no_run
/// # use qz_core::persistence::DatabaseContext;
/// # use qz_core::repositories::USER_REPOSITORY;
/// # use qz_core::errors::DomainError;
/// # async fn example(context: &DatabaseContext) -> Result<(), DomainError> {
/// let users = context.repository(&USER_REPOSITORY)?;
/// let total = users.count().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Conflict)` - The email is already registered
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace an existing user
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - No user with that id
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Remove a user; `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
