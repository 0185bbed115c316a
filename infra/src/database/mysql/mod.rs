//! MySQL repository implementations.

mod badge_repository_impl;
mod question_repository_impl;
mod quiz_session_repository_impl;
mod user_repository_impl;

pub use badge_repository_impl::MySqlBadgeRepository;
pub use question_repository_impl::MySqlQuestionRepository;
pub use quiz_session_repository_impl::MySqlQuizSessionRepository;
pub use user_repository_impl::MySqlUserRepository;

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

use qz_core::errors::DomainError;

/// Read a column, reporting decode failures as internal errors
fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

/// Read a `CHAR(36)` uuid column
fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", name, e),
    })
}

/// Read a JSON-encoded column
fn json_column<T: serde::de::DeserializeOwned>(row: &MySqlRow, name: &str) -> Result<T, DomainError> {
    let raw: String = column(row, name)?;
    serde_json::from_str(&raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid JSON in {}: {}", name, e),
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::Internal {
        message: format!("Failed to encode JSON: {}", e),
    })
}
