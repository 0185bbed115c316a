//! Configuration module
//!
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server configuration

pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Re-export commonly used types
pub use database::{DatabaseConfig, PoolSettings};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Configuration suitable for tests: in-memory friendly, lazy pools
    pub fn for_tests() -> Self {
        Self {
            environment: Environment::Test,
            server: ServerConfig::default(),
            database: DatabaseConfig::new("mysql://localhost:3306/quizprep_test").lazily(),
            logging: LoggingConfig::for_environment(Environment::Test),
        }
    }

    /// Load configuration from the process environment
    ///
    /// Fails when `DATABASE_URL` is missing or malformed; there is no fallback
    /// connection string.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        Ok(Self {
            environment,
            server: ServerConfig::from_lookup(|key| std::env::var(key).ok())?,
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::for_environment(environment).with_env_overrides(),
        })
    }
}
