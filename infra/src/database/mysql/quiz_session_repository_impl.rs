//! MySQL implementation of the QuizSessionRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use tracing::{Instrument, Span};
use uuid::Uuid;

use qz_core::domain::entities::quiz_session::QuizSession;
use qz_core::errors::DomainError;
use qz_core::repositories::quiz_session::ensure_completable;
use qz_core::repositories::QuizSessionRepository;

use super::{column, json_column, to_json, uuid_column};
use crate::database::executor::MySqlExecutor;

const SESSION_COLUMNS: &str =
    "id, user_id, certification, question_ids, correct_answers, started_at, completed_at";

pub struct MySqlQuizSessionRepository {
    executor: MySqlExecutor,
    span: Span,
}

impl MySqlQuizSessionRepository {
    pub fn new(executor: MySqlExecutor, span: Span) -> Self {
        Self { executor, span }
    }

    fn row_to_session(row: &MySqlRow) -> Result<QuizSession, DomainError> {
        Ok(QuizSession {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            certification: column(row, "certification")?,
            question_ids: json_column(row, "question_ids")?,
            correct_answers: column(row, "correct_answers")?,
            started_at: column(row, "started_at")?,
            completed_at: column(row, "completed_at")?,
        })
    }
}

#[async_trait]
impl QuizSessionRepository for MySqlQuizSessionRepository {
    async fn create(&self, session: QuizSession) -> Result<QuizSession, DomainError> {
        let question_ids = to_json(&session.question_ids)?;

        let query = r#"
            INSERT INTO quiz_sessions (
                id, user_id, certification, question_ids, correct_answers,
                started_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        self.executor
            .execute(
                sqlx::query(query)
                    .bind(session.id.to_string())
                    .bind(session.user_id.to_string())
                    .bind(&session.certification)
                    .bind(question_ids)
                    .bind(session.correct_answers)
                    .bind(session.started_at)
                    .bind(session.completed_at),
            )
            .instrument(self.span.clone())
            .await?;

        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QuizSession>, DomainError> {
        let query = format!("SELECT {} FROM quiz_sessions WHERE id = ? LIMIT 1", SESSION_COLUMNS);

        let row = self
            .executor
            .fetch_optional(sqlx::query(&query).bind(id.to_string()))
            .instrument(self.span.clone())
            .await?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<QuizSession>, DomainError> {
        let query = format!(
            "SELECT {} FROM quiz_sessions WHERE user_id = ? ORDER BY started_at DESC",
            SESSION_COLUMNS
        );

        let rows = self
            .executor
            .fetch_all(sqlx::query(&query).bind(user_id.to_string()))
            .instrument(self.span.clone())
            .await?;

        rows.iter().map(Self::row_to_session).collect()
    }

    async fn complete(
        &self,
        id: Uuid,
        correct_answers: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<QuizSession, DomainError> {
        let mut session = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("QuizSession"))?;

        ensure_completable(&session, correct_answers)?;

        self.executor
            .execute(
                sqlx::query(
                    "UPDATE quiz_sessions SET correct_answers = ?, completed_at = ? \
                     WHERE id = ? AND completed_at IS NULL",
                )
                .bind(correct_answers)
                .bind(completed_at)
                .bind(id.to_string()),
            )
            .instrument(self.span.clone())
            .await?;

        session.correct_answers = correct_answers;
        session.completed_at = Some(completed_at);
        Ok(session)
    }
}
