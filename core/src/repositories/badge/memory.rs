//! In-memory implementation of BadgeRepository

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::badge::UserBadge;
use crate::errors::DomainError;
use crate::persistence::memory::MemoryState;

use super::trait_::BadgeRepository;

pub struct InMemoryBadgeRepository {
    state: MemoryState,
}

impl InMemoryBadgeRepository {
    pub fn new(state: MemoryState) -> Self {
        Self { state }
    }
}

impl Default for InMemoryBadgeRepository {
    fn default() -> Self {
        Self::new(MemoryState::default())
    }
}

#[async_trait]
impl BadgeRepository for InMemoryBadgeRepository {
    async fn award(&self, badge: UserBadge) -> Result<UserBadge, DomainError> {
        let mut tables = self.state.write().await?;

        if tables
            .badges
            .values()
            .any(|b| b.user_id == badge.user_id && b.badge_code == badge.badge_code)
        {
            return Err(DomainError::Conflict {
                message: format!("Badge {} already awarded", badge.badge_code),
            });
        }

        tables.badges.insert(badge.id, badge.clone());
        Ok(badge)
    }

    async fn has_badge(&self, user_id: Uuid, badge_code: &str) -> Result<bool, DomainError> {
        let tables = self.state.read().await?;
        Ok(tables
            .badges
            .values()
            .any(|b| b.user_id == user_id && b.badge_code == badge_code))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<UserBadge>, DomainError> {
        let tables = self.state.read().await?;
        let mut badges: Vec<UserBadge> = tables
            .badges
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        badges.sort_by(|a, b| a.awarded_at.cmp(&b.awarded_at));
        Ok(badges)
    }
}
