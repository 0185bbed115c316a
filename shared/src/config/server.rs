//! Server configuration module

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            workers: 0, // Use all CPU cores
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Read `SERVER_HOST` / `SERVER_PORT` / `SERVER_WORKERS`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVariable {
                name: "SERVER_PORT",
                message: format!("'{}' is not a valid port number", raw),
            })?,
            None => defaults.port,
        };
        let workers = match lookup("SERVER_WORKERS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVariable {
                name: "SERVER_WORKERS",
                message: format!("'{}' is not a valid worker count", raw),
            })?,
            None => defaults.workers,
        };

        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port,
            workers,
            ..defaults
        })
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_shutdown_timeout() -> u64 {
    30
}
