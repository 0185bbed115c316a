//! Badges awarded to users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Badge every new account receives
pub const WELCOME_BADGE: &str = "welcome";

/// A badge held by a user; `(user_id, badge_code)` is unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_code: String,
    pub awarded_at: DateTime<Utc>,
}

impl UserBadge {
    pub fn new(user_id: Uuid, badge_code: impl Into<String>) -> Self {
        Self::award(Uuid::new_v4(), user_id, badge_code, Utc::now())
    }

    pub fn award(
        id: Uuid,
        user_id: Uuid,
        badge_code: impl Into<String>,
        awarded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            badge_code: badge_code.into(),
            awarded_at,
        }
    }
}
