//! # Infrastructure Layer
//!
//! MySQL-backed implementations of the QuizPrep persistence contracts and the
//! composition root that wires them into the service container.
//!
//! - **Database**: pooled MySQL connections keyed by url and worker, the
//!   transaction-aware executor and sqlx repositories
//! - **Composition**: per-environment container configuration

pub mod composition;
pub mod database;

pub use composition::{build_container, DATABASE_PROVIDER, IN_MEMORY_STORE};

use qz_core::errors::DomainError;
use qz_shared::ConfigError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error raised by the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => DomainError::persistence(e),
            InfrastructureError::Config(e) => DomainError::Configuration {
                message: e.to_string(),
            },
            InfrastructureError::Domain(e) => e,
            InfrastructureError::General(message) => DomainError::Internal { message },
        }
    }
}
