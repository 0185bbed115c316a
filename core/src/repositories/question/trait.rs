//! Question bank persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::question::{Question, QuestionStatus};
use crate::errors::DomainError;

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>, DomainError>;

    /// Store a new question
    ///
    /// Fails with `DomainError::Validation` when `correct_choice` does not
    /// index into `choices`.
    async fn create(&self, question: Question) -> Result<Question, DomainError>;

    /// Approved questions for a certification, oldest first, at most `limit`
    async fn find_approved(
        &self,
        certification: &str,
        limit: u32,
    ) -> Result<Vec<Question>, DomainError>;

    /// Moderate a question; `DomainError::NotFound` if it does not exist
    async fn set_status(&self, id: Uuid, status: QuestionStatus)
        -> Result<Question, DomainError>;

    async fn count_by_status(&self, status: QuestionStatus) -> Result<u64, DomainError>;
}

/// Reject questions whose answer index is out of range
pub fn ensure_valid_answer(question: &Question) -> Result<(), DomainError> {
    if question.has_valid_answer() {
        Ok(())
    } else {
        Err(DomainError::Validation {
            message: format!(
                "Correct choice {} is out of range for {} choices",
                question.correct_choice,
                question.choices.len()
            ),
        })
    }
}
