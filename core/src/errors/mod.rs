//! Domain-specific error types and error handling.

use thiserror::Error;

use crate::container::ContainerError;

/// Boxed driver error kept intact as the source of a persistence failure
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unknown repository token: {name}")]
    UnknownRepository { name: String },

    #[error("Transaction already completed")]
    TransactionClosed,

    /// Database-level failure, propagated without reclassification
    #[error("Persistence error: {0}")]
    Persistence(#[source] BoxedError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Wrap a driver error without altering it
    pub fn persistence<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DomainError::Persistence(Box::new(error))
    }

    /// Shorthand for a missing resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }
}

/// A factory that failed with a `DomainError` (directly or through a nested
/// resolution) yields that error unchanged; everything else is a
/// configuration problem.
impl From<ContainerError> for DomainError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::Factory { name, source } => match source.downcast::<DomainError>() {
                Ok(domain) => domain,
                Err(source) => match source.downcast::<ContainerError>() {
                    Ok(nested) => DomainError::from(nested),
                    Err(source) => DomainError::Configuration {
                        message: format!("Failed to construct service {}: {}", name, source),
                    },
                },
            },
            other => DomainError::Configuration {
                message: other.to_string(),
            },
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
