//! Quiz session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::quiz_session::QuizSession;
use crate::errors::DomainError;

#[async_trait]
pub trait QuizSessionRepository: Send + Sync {
    async fn create(&self, session: QuizSession) -> Result<QuizSession, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QuizSession>, DomainError>;

    /// Sessions of one user, most recent first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<QuizSession>, DomainError>;

    /// Record the result of a session
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - Unknown session
    /// * `Err(DomainError::BusinessRule)` - Session already completed
    /// * `Err(DomainError::Validation)` - More correct answers than questions
    async fn complete(
        &self,
        id: Uuid,
        correct_answers: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<QuizSession, DomainError>;
}

/// Check that `session` may be completed with `correct_answers`
pub fn ensure_completable(session: &QuizSession, correct_answers: u32) -> Result<(), DomainError> {
    if session.is_completed() {
        return Err(DomainError::BusinessRule {
            message: format!("Quiz session {} is already completed", session.id),
        });
    }
    if correct_answers > session.total_questions() {
        return Err(DomainError::Validation {
            message: format!(
                "{} correct answers exceed {} questions",
                correct_answers,
                session.total_questions()
            ),
        });
    }
    Ok(())
}
