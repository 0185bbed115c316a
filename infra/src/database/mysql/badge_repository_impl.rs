//! MySQL implementation of the BadgeRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use tracing::{Instrument, Span};
use uuid::Uuid;

use qz_core::domain::entities::badge::UserBadge;
use qz_core::errors::DomainError;
use qz_core::repositories::BadgeRepository;

use super::{column, uuid_column};
use crate::database::executor::MySqlExecutor;

pub struct MySqlBadgeRepository {
    executor: MySqlExecutor,
    span: Span,
}

impl MySqlBadgeRepository {
    pub fn new(executor: MySqlExecutor, span: Span) -> Self {
        Self { executor, span }
    }

    fn row_to_badge(row: &MySqlRow) -> Result<UserBadge, DomainError> {
        Ok(UserBadge {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            badge_code: column(row, "badge_code")?,
            awarded_at: column(row, "awarded_at")?,
        })
    }
}

#[async_trait]
impl BadgeRepository for MySqlBadgeRepository {
    async fn award(&self, badge: UserBadge) -> Result<UserBadge, DomainError> {
        // Check for an existing award first
        if self.has_badge(badge.user_id, &badge.badge_code).await? {
            return Err(DomainError::Conflict {
                message: format!("Badge {} already awarded", badge.badge_code),
            });
        }

        let query = r#"
            INSERT INTO user_badges (id, user_id, badge_code, awarded_at)
            VALUES (?, ?, ?, ?)
        "#;

        self.executor
            .execute(
                sqlx::query(query)
                    .bind(badge.id.to_string())
                    .bind(badge.user_id.to_string())
                    .bind(&badge.badge_code)
                    .bind(badge.awarded_at),
            )
            .instrument(self.span.clone())
            .await?;

        Ok(badge)
    }

    async fn has_badge(&self, user_id: Uuid, badge_code: &str) -> Result<bool, DomainError> {
        let query = "SELECT EXISTS(SELECT 1 FROM user_badges WHERE user_id = ? AND badge_code = ?) AS awarded";

        let row = self
            .executor
            .fetch_one(sqlx::query(query).bind(user_id.to_string()).bind(badge_code))
            .instrument(self.span.clone())
            .await?;

        let awarded: i64 = column(&row, "awarded")?;
        Ok(awarded == 1)
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<UserBadge>, DomainError> {
        let query = r#"
            SELECT id, user_id, badge_code, awarded_at
            FROM user_badges
            WHERE user_id = ?
            ORDER BY awarded_at
        "#;

        let rows = self
            .executor
            .fetch_all(sqlx::query(query).bind(user_id.to_string()))
            .instrument(self.span.clone())
            .await?;

        rows.iter().map(Self::row_to_badge).collect()
    }
}
