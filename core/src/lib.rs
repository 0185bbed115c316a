//! # QuizPrep Core
//!
//! Domain layer and transactional persistence core for the QuizPrep backend:
//! entities, repository contracts with in-memory implementations, the async
//! service container and the unit-of-work / database context machinery.

pub mod container;
pub mod domain;
pub mod errors;
pub mod persistence;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use container::{Container, ContainerError, Lifetime, RepositoryToken, ServiceToken};
pub use domain::{Question, QuestionStatus, QuizSession, User, UserBadge, UserRole};
pub use errors::{DomainError, DomainResult};
pub use persistence::{DatabaseContext, TransactionScope, DATABASE_CONTEXT};
pub use services::{Clock, IdGenerator, CLOCK, ID_GENERATOR};
