pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryQuestionRepository;
pub use r#trait::{ensure_valid_answer, QuestionRepository};
