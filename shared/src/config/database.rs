//! Database configuration module

use serde::{Deserialize, Serialize};

use super::environment::Environment;
use crate::errors::ConfigError;
use crate::utils::validation::validate_connection_string;

/// Default production pool size when `DB_POOL_MAX` is not set
pub const DEFAULT_PRODUCTION_POOL_MAX: u32 = 20;

/// Database configuration for MySQL connections
///
/// Pool sizing is not part of this struct: it depends on the environment and
/// is derived through [`PoolSettings::for_environment`] when a pool is opened.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout: u64,

    /// Maximum lifetime of a connection in seconds
    pub max_lifetime: u64,

    /// Upper bound for closing one pool during shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,

    /// Production pool size override (`DB_POOL_MAX`)
    #[serde(default)]
    pub pool_max_override: Option<u32>,

    /// Isolation key for parallel test workers
    #[serde(default)]
    pub worker_id: Option<String>,

    /// Open pools without establishing a connection up front
    #[serde(default)]
    pub connect_lazily: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("mysql://localhost:3306/quizprep"),
            connect_timeout: 30,
            idle_timeout: 600,
            max_lifetime: 1800,
            shutdown_timeout: default_shutdown_timeout(),
            pool_max_override: None,
            worker_id: None,
            connect_lazily: false,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create from process environment variables
    ///
    /// `DATABASE_URL` is required and must carry a MySQL scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or(ConfigError::MissingVariable {
            name: "DATABASE_URL",
        })?;
        validate_connection_string(&url)?;

        let pool_max_override = parse_optional(&lookup, "DB_POOL_MAX")?;
        if pool_max_override == Some(0) {
            return Err(ConfigError::InvalidVariable {
                name: "DB_POOL_MAX",
                message: "pool size must be at least 1".to_string(),
            });
        }

        let defaults = Self::default();
        Ok(Self {
            url,
            connect_timeout: parse_optional(&lookup, "DB_CONNECT_TIMEOUT")?
                .unwrap_or(defaults.connect_timeout),
            shutdown_timeout: parse_optional(&lookup, "DB_SHUTDOWN_TIMEOUT")?
                .unwrap_or(defaults.shutdown_timeout),
            pool_max_override,
            worker_id: lookup("DB_WORKER_ID").or_else(|| lookup("TEST_WORKER_ID")),
            ..defaults
        })
    }

    /// Set the production pool size override
    pub fn with_pool_max(mut self, max: u32) -> Self {
        self.pool_max_override = Some(max);
        self
    }

    /// Set the worker isolation key
    pub fn with_worker_id(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    /// Open pools lazily (no connection until first use)
    pub fn lazily(mut self) -> Self {
        self.connect_lazily = true;
        self
    }
}

/// Environment-dependent pool parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// Prepared statement cache size per connection (0 disables caching)
    pub statement_cache_capacity: usize,
    /// Ping connections before handing them out
    pub test_before_acquire: bool,
}

impl PoolSettings {
    /// Derive pool settings for an environment
    ///
    /// Tests get a single connection without statement caching so parallel
    /// workers never observe each other's prepared statements.
    pub fn for_environment(env: Environment, config: &DatabaseConfig) -> Self {
        match env {
            Environment::Test => Self {
                max_connections: 1,
                min_connections: 0,
                statement_cache_capacity: 0,
                test_before_acquire: false,
            },
            Environment::Development => Self {
                max_connections: 5,
                min_connections: 1,
                statement_cache_capacity: 100,
                test_before_acquire: true,
            },
            Environment::Production => Self {
                max_connections: config
                    .pool_max_override
                    .unwrap_or(DEFAULT_PRODUCTION_POOL_MAX),
                min_connections: 2,
                statement_cache_capacity: 100,
                test_before_acquire: true,
            },
        }
    }
}

fn parse_optional<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVariable {
                name,
                message: e.to_string(),
            }),
    }
}

fn default_shutdown_timeout() -> u64 {
    5
}
