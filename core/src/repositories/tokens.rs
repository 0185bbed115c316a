//! Repository tokens shared by every backend's registry.

use once_cell::sync::Lazy;

use super::{BadgeRepository, QuestionRepository, QuizSessionRepository, UserRepository};
use crate::container::RepositoryToken;

pub static USER_REPOSITORY: Lazy<RepositoryToken<dyn UserRepository>> =
    Lazy::new(|| RepositoryToken::new("UserRepository"));

pub static QUESTION_REPOSITORY: Lazy<RepositoryToken<dyn QuestionRepository>> =
    Lazy::new(|| RepositoryToken::new("QuestionRepository"));

pub static QUIZ_SESSION_REPOSITORY: Lazy<RepositoryToken<dyn QuizSessionRepository>> =
    Lazy::new(|| RepositoryToken::new("QuizSessionRepository"));

pub static BADGE_REPOSITORY: Lazy<RepositoryToken<dyn BadgeRepository>> =
    Lazy::new(|| RepositoryToken::new("BadgeRepository"));
