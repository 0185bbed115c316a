//! Shared utilities and common types for the QuizPrep server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and environment detection
//! - Error types and response structures
//! - Connection string validation

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig, PoolSettings, ServerConfig,
};
pub use errors::{error_codes, ConfigError, ErrorResponse};
pub use utils::validation;
