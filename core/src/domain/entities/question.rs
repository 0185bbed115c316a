//! Question entity for the certification question banks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation state of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    /// Submitted, waiting for a moderator
    Pending,
    /// Visible in quizzes
    Approved,
    /// Refused by a moderator
    Rejected,
}

impl QuestionStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Approved => "approved",
            QuestionStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for QuestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(QuestionStatus::Pending),
            "approved" => Ok(QuestionStatus::Approved),
            "rejected" => Ok(QuestionStatus::Rejected),
            other => Err(format!("Unknown question status: {}", other)),
        }
    }
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    /// Certification the question belongs to (e.g. "aws-saa")
    pub certification: String,
    pub prompt: String,
    pub choices: Vec<String>,
    /// Index into `choices`
    pub correct_choice: u32,
    pub status: QuestionStatus,
    /// Submitting user, if any
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Creates a pending question
    pub fn new(
        certification: impl Into<String>,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct_choice: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            certification: certification.into(),
            prompt: prompt.into(),
            choices,
            correct_choice,
            status: QuestionStatus::Pending,
            author_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `correct_choice` points at an existing choice
    pub fn has_valid_answer(&self) -> bool {
        (self.correct_choice as usize) < self.choices.len()
    }

    /// Whether the given choice is the right one
    pub fn is_correct(&self, choice: u32) -> bool {
        choice == self.correct_choice
    }
}
