//! Quiz session entity tracking one attempt at a set of questions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub certification: String,
    pub question_ids: Vec<Uuid>,
    pub correct_answers: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Starts a new session over the given questions
    pub fn start(user_id: Uuid, certification: impl Into<String>, question_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            certification: certification.into(),
            question_ids,
            correct_answers: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn total_questions(&self) -> u32 {
        self.question_ids.len() as u32
    }

    /// Score as a percentage, 0 for an empty session
    pub fn score_percent(&self) -> u32 {
        match self.total_questions() {
            0 => 0,
            total => self.correct_answers * 100 / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_percent() {
        let mut session = QuizSession::start(
            Uuid::new_v4(),
            "aws-saa",
            vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
        );
        assert!(!session.is_completed());
        session.correct_answers = 3;
        assert_eq!(session.score_percent(), 75);

        let empty = QuizSession::start(Uuid::new_v4(), "aws-saa", Vec::new());
        assert_eq!(empty.score_percent(), 0);
    }
}
