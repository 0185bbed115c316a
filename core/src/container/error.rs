//! Service container errors

use qz_shared::Environment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    /// No registration exists for the requested token
    #[error("Service not registered: {name}")]
    NotRegistered { name: String },

    /// The factory for the token failed; nothing was cached
    #[error("Failed to construct service {name}: {source}")]
    Factory {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The stored instance does not have the token's type
    #[error("Service {name} resolved to an unexpected type")]
    TypeMismatch { name: String },

    /// `configure_for_environment` was called for an environment without a snapshot
    #[error("No service configuration registered for environment: {environment}")]
    EnvironmentNotConfigured { environment: Environment },
}
