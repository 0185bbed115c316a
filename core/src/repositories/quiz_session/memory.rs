//! In-memory implementation of QuizSessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::quiz_session::QuizSession;
use crate::errors::DomainError;
use crate::persistence::memory::MemoryState;

use super::trait_::{ensure_completable, QuizSessionRepository};

pub struct InMemoryQuizSessionRepository {
    state: MemoryState,
}

impl InMemoryQuizSessionRepository {
    pub fn new(state: MemoryState) -> Self {
        Self { state }
    }
}

impl Default for InMemoryQuizSessionRepository {
    fn default() -> Self {
        Self::new(MemoryState::default())
    }
}

#[async_trait]
impl QuizSessionRepository for InMemoryQuizSessionRepository {
    async fn create(&self, session: QuizSession) -> Result<QuizSession, DomainError> {
        let mut tables = self.state.write().await?;
        if tables.sessions.contains_key(&session.id) {
            return Err(DomainError::Conflict {
                message: format!("Quiz session already exists: {}", session.id),
            });
        }
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QuizSession>, DomainError> {
        let tables = self.state.read().await?;
        Ok(tables.sessions.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<QuizSession>, DomainError> {
        let tables = self.state.read().await?;
        let mut sessions: Vec<QuizSession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    async fn complete(
        &self,
        id: Uuid,
        correct_answers: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<QuizSession, DomainError> {
        let mut tables = self.state.write().await?;
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("QuizSession"))?;

        ensure_completable(session, correct_answers)?;
        session.correct_answers = correct_answers;
        session.completed_at = Some(completed_at);
        Ok(session.clone())
    }
}
