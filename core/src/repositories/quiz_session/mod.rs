pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryQuizSessionRepository;
pub use r#trait::{ensure_completable, QuizSessionRepository};
