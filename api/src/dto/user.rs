use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use qz_core::domain::entities::{User, UserBadge, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login email; stored lowercased
    #[validate(email)]
    pub email: String,

    /// Name shown on leaderboards
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_premium: bool,
    /// Badge codes in award order
    pub badges: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_parts(user: User, badges: Vec<UserBadge>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
            is_premium: user.is_premium,
            badges: badges.into_iter().map(|badge| badge.badge_code).collect(),
            created_at: user.created_at,
        }
    }
}
