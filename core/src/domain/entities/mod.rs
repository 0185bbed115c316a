//! Domain entities representing core business objects.

pub mod badge;
pub mod question;
pub mod quiz_session;
pub mod user;

// Re-export commonly used types
pub use badge::{UserBadge, WELCOME_BADGE};
pub use question::{Question, QuestionStatus};
pub use quiz_session::QuizSession;
pub use user::{User, UserRole};
