//! MySQL implementation of the QuestionRepository trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;
use tracing::{Instrument, Span};
use uuid::Uuid;

use qz_core::domain::entities::question::{Question, QuestionStatus};
use qz_core::errors::DomainError;
use qz_core::repositories::question::ensure_valid_answer;
use qz_core::repositories::QuestionRepository;

use super::{column, json_column, to_json, uuid_column};
use crate::database::executor::MySqlExecutor;

const QUESTION_COLUMNS: &str =
    "id, certification, prompt, choices, correct_choice, status, author_id, created_at, updated_at";

pub struct MySqlQuestionRepository {
    executor: MySqlExecutor,
    span: Span,
}

impl MySqlQuestionRepository {
    pub fn new(executor: MySqlExecutor, span: Span) -> Self {
        Self { executor, span }
    }

    fn row_to_question(row: &MySqlRow) -> Result<Question, DomainError> {
        let status: String = column(row, "status")?;
        let author_id: Option<String> = column(row, "author_id")?;

        Ok(Question {
            id: uuid_column(row, "id")?,
            certification: column(row, "certification")?,
            prompt: column(row, "prompt")?,
            choices: json_column(row, "choices")?,
            correct_choice: column(row, "correct_choice")?,
            status: status.parse::<QuestionStatus>().map_err(|e| DomainError::Internal {
                message: format!("Invalid question status: {}", e),
            })?,
            author_id: author_id
                .map(|raw| Uuid::parse_str(&raw))
                .transpose()
                .map_err(|e| DomainError::Internal {
                    message: format!("Invalid author UUID: {}", e),
                })?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl QuestionRepository for MySqlQuestionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>, DomainError> {
        let query = format!("SELECT {} FROM questions WHERE id = ? LIMIT 1", QUESTION_COLUMNS);

        let row = self
            .executor
            .fetch_optional(sqlx::query(&query).bind(id.to_string()))
            .instrument(self.span.clone())
            .await?;

        row.as_ref().map(Self::row_to_question).transpose()
    }

    async fn create(&self, question: Question) -> Result<Question, DomainError> {
        ensure_valid_answer(&question)?;
        let choices = to_json(&question.choices)?;

        let query = r#"
            INSERT INTO questions (
                id, certification, prompt, choices, correct_choice, status,
                author_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        self.executor
            .execute(
                sqlx::query(query)
                    .bind(question.id.to_string())
                    .bind(&question.certification)
                    .bind(&question.prompt)
                    .bind(choices)
                    .bind(question.correct_choice)
                    .bind(question.status.as_str())
                    .bind(question.author_id.map(|id| id.to_string()))
                    .bind(question.created_at)
                    .bind(question.updated_at),
            )
            .instrument(self.span.clone())
            .await?;

        Ok(question)
    }

    async fn find_approved(
        &self,
        certification: &str,
        limit: u32,
    ) -> Result<Vec<Question>, DomainError> {
        let query = format!(
            "SELECT {} FROM questions WHERE certification = ? AND status = ? \
             ORDER BY created_at, id LIMIT ?",
            QUESTION_COLUMNS
        );

        let rows = self
            .executor
            .fetch_all(
                sqlx::query(&query)
                    .bind(certification)
                    .bind(QuestionStatus::Approved.as_str())
                    .bind(limit),
            )
            .instrument(self.span.clone())
            .await?;

        rows.iter().map(Self::row_to_question).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: QuestionStatus,
    ) -> Result<Question, DomainError> {
        let result = self
            .executor
            .execute(
                sqlx::query("UPDATE questions SET status = ?, updated_at = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(Utc::now())
                    .bind(id.to_string()),
            )
            .instrument(self.span.clone())
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(parent: &self.span, question_id = %id, "Status update matched no row");
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Question"))
    }

    async fn count_by_status(&self, status: QuestionStatus) -> Result<u64, DomainError> {
        let row = self
            .executor
            .fetch_one(
                sqlx::query("SELECT COUNT(*) AS total FROM questions WHERE status = ?")
                    .bind(status.as_str()),
            )
            .instrument(self.span.clone())
            .await?;

        let total: i64 = column(&row, "total")?;
        Ok(total as u64)
    }
}
