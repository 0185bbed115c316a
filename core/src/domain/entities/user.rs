//! User entity representing a registered learner or staff member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a user in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A learner taking quizzes
    Student,
    /// A reviewer approving submitted questions
    Moderator,
    /// Full administrative access
    Admin,
}

impl UserRole {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Moderator => "moderator",
            UserRole::Admin => "admin",
        }
    }

    /// Whether the role may moderate the question bank
    pub fn can_moderate(&self) -> bool {
        matches!(self, UserRole::Moderator | UserRole::Admin)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown user role: {}", other)),
        }
    }
}

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email, unique across accounts
    pub email: String,

    /// Name shown on leaderboards and badges
    pub display_name: String,

    /// Role of the user
    pub role: UserRole,

    /// Whether the user has premium question access
    pub is_premium: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new student with a random id
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::register(Uuid::new_v4(), email, display_name, Utc::now())
    }

    /// Creates a new student with an explicit identity and timestamp
    pub fn register(
        id: Uuid,
        email: impl Into<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into().trim().to_lowercase(),
            display_name: display_name.into(),
            role: UserRole::Student,
            is_premium: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Changes the user's role
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Grants premium access
    pub fn upgrade_to_premium(&mut self) {
        self.is_premium = true;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_student() {
        let user = User::new("Learner@Example.com ", "Learner");
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.email, "learner@example.com");
        assert!(!user.is_premium);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_role_round_trip_and_permissions() {
        for role in [UserRole::Student, UserRole::Moderator, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!(!UserRole::Student.can_moderate());
        assert!(UserRole::Moderator.can_moderate());
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_upgrade_to_premium() {
        let mut user = User::new("a@example.com", "A");
        user.upgrade_to_premium();
        assert!(user.is_premium);
    }

    #[test]
    fn test_serializes_role_lowercase() {
        let mut user = User::new("mod@example.com", "Mod");
        user.set_role(UserRole::Moderator);

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "moderator");
        assert_eq!(json["email"], "mod@example.com");
    }
}
