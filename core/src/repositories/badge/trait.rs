//! Badge award persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::badge::UserBadge;
use crate::errors::DomainError;

#[async_trait]
pub trait BadgeRepository: Send + Sync {
    /// Award a badge; `DomainError::Conflict` if the user already holds it
    async fn award(&self, badge: UserBadge) -> Result<UserBadge, DomainError>;

    async fn has_badge(&self, user_id: Uuid, badge_code: &str) -> Result<bool, DomainError>;

    /// Badges of one user in award order
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<UserBadge>, DomainError>;
}
