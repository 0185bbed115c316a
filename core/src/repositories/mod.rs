pub mod badge;
pub mod question;
pub mod quiz_session;
pub mod tokens;
pub mod user;

pub use badge::{BadgeRepository, InMemoryBadgeRepository};
pub use question::{InMemoryQuestionRepository, QuestionRepository};
pub use quiz_session::{InMemoryQuizSessionRepository, QuizSessionRepository};
pub use tokens::{BADGE_REPOSITORY, QUESTION_REPOSITORY, QUIZ_SESSION_REPOSITORY, USER_REPOSITORY};
pub use user::{InMemoryUserRepository, UserRepository};
