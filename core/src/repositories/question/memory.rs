//! In-memory implementation of QuestionRepository

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::question::{Question, QuestionStatus};
use crate::errors::DomainError;
use crate::persistence::memory::MemoryState;

use super::trait_::{ensure_valid_answer, QuestionRepository};

pub struct InMemoryQuestionRepository {
    state: MemoryState,
}

impl InMemoryQuestionRepository {
    pub fn new(state: MemoryState) -> Self {
        Self { state }
    }
}

impl Default for InMemoryQuestionRepository {
    fn default() -> Self {
        Self::new(MemoryState::default())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>, DomainError> {
        let tables = self.state.read().await?;
        Ok(tables.questions.get(&id).cloned())
    }

    async fn create(&self, question: Question) -> Result<Question, DomainError> {
        ensure_valid_answer(&question)?;

        let mut tables = self.state.write().await?;
        if tables.questions.contains_key(&question.id) {
            return Err(DomainError::Conflict {
                message: format!("Question already exists: {}", question.id),
            });
        }
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn find_approved(
        &self,
        certification: &str,
        limit: u32,
    ) -> Result<Vec<Question>, DomainError> {
        let tables = self.state.read().await?;
        let mut approved: Vec<Question> = tables
            .questions
            .values()
            .filter(|q| q.status == QuestionStatus::Approved && q.certification == certification)
            .cloned()
            .collect();
        approved.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        approved.truncate(limit as usize);
        Ok(approved)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: QuestionStatus,
    ) -> Result<Question, DomainError> {
        let mut tables = self.state.write().await?;
        let question = tables
            .questions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Question"))?;

        question.status = status;
        question.updated_at = Utc::now();
        Ok(question.clone())
    }

    async fn count_by_status(&self, status: QuestionStatus) -> Result<u64, DomainError> {
        let tables = self.state.read().await?;
        Ok(tables.questions.values().filter(|q| q.status == status).count() as u64)
    }
}
