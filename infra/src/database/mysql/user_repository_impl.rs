//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use tracing::{Instrument, Span};
use uuid::Uuid;

use qz_core::domain::entities::user::{User, UserRole};
use qz_core::errors::DomainError;
use qz_core::repositories::UserRepository;

use super::{column, uuid_column};
use crate::database::executor::MySqlExecutor;

const USER_COLUMNS: &str = "id, email, display_name, role, is_premium, created_at, updated_at";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    executor: MySqlExecutor,
    span: Span,
}

impl MySqlUserRepository {
    pub fn new(executor: MySqlExecutor, span: Span) -> Self {
        Self { executor, span }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        let role: String = column(row, "role")?;

        Ok(User {
            id: uuid_column(row, "id")?,
            email: column(row, "email")?,
            display_name: column(row, "display_name")?,
            role: role.parse::<UserRole>().map_err(|e| DomainError::Internal {
                message: format!("Invalid role: {}", e),
            })?,
            is_premium: column(row, "is_premium")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, DomainError> {
        let query = "SELECT EXISTS(SELECT 1 FROM users WHERE email = ? AND id <> ?) AS taken";
        let row = self
            .executor
            .fetch_one(
                sqlx::query(query)
                    .bind(email)
                    .bind(except.map(|id| id.to_string()).unwrap_or_default()),
            )
            .await?;
        let taken: i64 = column(&row, "taken")?;
        Ok(taken == 1)
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);

        let row = self
            .executor
            .fetch_optional(sqlx::query(&query).bind(id.to_string()))
            .instrument(self.span.clone())
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = ? LIMIT 1", USER_COLUMNS);
        let email = email.trim().to_lowercase();

        let row = self
            .executor
            .fetch_optional(sqlx::query(&query).bind(&email))
            .instrument(self.span.clone())
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        // Check for duplicate email first
        if self.email_taken(&user.email, None).await? {
            return Err(DomainError::Conflict {
                message: format!("Email already registered: {}", user.email),
            });
        }

        let query = r#"
            INSERT INTO users (
                id, email, display_name, role, is_premium, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        self.executor
            .execute(
                sqlx::query(query)
                    .bind(user.id.to_string())
                    .bind(&user.email)
                    .bind(&user.display_name)
                    .bind(user.role.as_str())
                    .bind(user.is_premium)
                    .bind(user.created_at)
                    .bind(user.updated_at),
            )
            .instrument(self.span.clone())
            .await?;

        tracing::debug!(parent: &self.span, user_id = %user.id, "User created");
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        if self.email_taken(&user.email, Some(user.id)).await? {
            return Err(DomainError::Conflict {
                message: format!("Email already registered: {}", user.email),
            });
        }

        let query = r#"
            UPDATE users
            SET email = ?, display_name = ?, role = ?, is_premium = ?, updated_at = ?
            WHERE id = ?
        "#;

        let result = self
            .executor
            .execute(
                sqlx::query(query)
                    .bind(&user.email)
                    .bind(&user.display_name)
                    .bind(user.role.as_str())
                    .bind(user.is_premium)
                    .bind(user.updated_at)
                    .bind(user.id.to_string()),
            )
            .instrument(self.span.clone())
            .await?;

        // MySQL reports matched-but-unchanged rows as 0 affected
        if result.rows_affected() == 0 && self.find_by_id(user.id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = self
            .executor
            .execute(sqlx::query("DELETE FROM users WHERE id = ?").bind(id.to_string()))
            .instrument(self.span.clone())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let row = self
            .executor
            .fetch_one(sqlx::query("SELECT COUNT(*) AS total FROM users"))
            .instrument(self.span.clone())
            .await?;

        let total: i64 = column(&row, "total")?;
        Ok(total as u64)
    }
}
