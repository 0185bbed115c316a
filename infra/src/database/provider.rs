//! Database provider: one pool per connection key.
//!
//! Pools are cached under `url` or `url#worker:<id>`, so parallel test
//! workers pointed at the same server never share connections. The cache
//! lock is held while a pool is opened, so concurrent first use of a key
//! opens exactly one pool. Pools are only ever closed after the lock is
//! released, bounded by the shutdown timeout.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use qz_shared::validation::{redact_credentials, validate_connection_string};
use qz_shared::{DatabaseConfig, Environment, PoolSettings};

use super::connection::DatabasePool;
use crate::InfrastructureError;

/// Which connection `get_database` should hand out
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    /// Connection string; the configured one when `None`
    pub url: Option<String>,
    /// Worker isolation key; the configured one when `None`
    pub worker_id: Option<String>,
    /// Close any cached pool for the key and open a new one
    pub force_new: bool,
}

impl ConnectionOptions {
    pub fn for_worker(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: Some(worker_id.into()),
            ..Self::default()
        }
    }

    pub fn fresh() -> Self {
        Self {
            force_new: true,
            ..Self::default()
        }
    }
}

struct Connection {
    pool: Arc<DatabasePool>,
    created_at: DateTime<Utc>,
}

/// Snapshot of the cached connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    pub count: usize,
    /// Cache keys, sorted
    pub keys: Vec<String>,
}

/// Cache key for a connection string and optional worker id
pub fn connection_key(url: &str, worker_id: Option<&str>) -> String {
    match worker_id {
        Some(worker) => format!("{}#worker:{}", url, worker),
        None => url.to_string(),
    }
}

pub struct DatabaseProvider {
    environment: Environment,
    config: DatabaseConfig,
    connections: Mutex<HashMap<String, Connection>>,
}

impl DatabaseProvider {
    pub fn new(environment: Environment, config: DatabaseConfig) -> Self {
        Self {
            environment,
            config,
            connections: Mutex::new(HashMap::new()),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Pool settings this provider opens connections with
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings::for_environment(self.environment, &self.config)
    }

    /// Cached pool for the options' key, opening one if needed
    #[instrument(skip(self, options), fields(environment = %self.environment, force_new = options.force_new))]
    pub async fn get_database(
        &self,
        options: ConnectionOptions,
    ) -> Result<Arc<DatabasePool>, InfrastructureError> {
        let url = options.url.unwrap_or_else(|| self.config.url.clone());
        let worker_id = options.worker_id.or_else(|| self.config.worker_id.clone());
        let key = connection_key(&url, worker_id.as_deref());

        let (opened, stale) = {
            let mut connections = self.connections.lock().await;

            let stale = if options.force_new {
                connections.remove(&key)
            } else if let Some(existing) = connections.get(&key) {
                debug!(connection = %redact_credentials(&key), "Reusing cached connection");
                return Ok(existing.pool.clone());
            } else {
                None
            };

            let opened = self.open(&url).await;
            if let Ok(pool) = &opened {
                connections.insert(
                    key.clone(),
                    Connection {
                        pool: pool.clone(),
                        created_at: Utc::now(),
                    },
                );
                info!(connection = %redact_credentials(&key), "Database connection opened");
            }
            (opened, stale)
        };

        // The replaced pool drains outside the cache lock
        if let Some(stale) = stale {
            info!(connection = %redact_credentials(&key), "Replacing cached connection");
            close_connection(&key, stale, self.shutdown_timeout()).await;
        }
        opened
    }

    async fn open(&self, url: &str) -> Result<Arc<DatabasePool>, InfrastructureError> {
        validate_connection_string(url)?;
        let settings = self.pool_settings();
        debug!(max_connections = settings.max_connections, "Opening database pool");
        Ok(Arc::new(DatabasePool::connect(url, &self.config, settings).await?))
    }

    fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.config.shutdown_timeout)
    }

    /// Pool for the configured url and worker
    pub async fn default_database(&self) -> Result<Arc<DatabasePool>, InfrastructureError> {
        self.get_database(ConnectionOptions::default()).await
    }

    /// Whether a pool is cached for the configured url and `worker_id`
    /// (the configured worker when `None`)
    pub async fn has_connection(&self, worker_id: Option<&str>) -> bool {
        let worker_id = worker_id.or(self.config.worker_id.as_deref());
        let key = connection_key(&self.config.url, worker_id);
        self.connections.lock().await.contains_key(&key)
    }

    pub async fn connection_stats(&self) -> ConnectionStats {
        let connections = self.connections.lock().await;
        let mut keys: Vec<String> = connections.keys().cloned().collect();
        keys.sort();
        ConnectionStats {
            count: keys.len(),
            keys,
        }
    }

    /// Close every cached pool
    ///
    /// Pools close in parallel, each bounded by the configured shutdown
    /// timeout. A pool that does not close in time is logged and abandoned.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, Connection)> = self.connections.lock().await.drain().collect();
        if drained.is_empty() {
            debug!("Database provider has no open connections");
            return;
        }

        let count = drained.len();
        let timeout = self.shutdown_timeout();
        info!(count, "Closing database connections");

        let closing = drained
            .into_iter()
            .map(|(key, connection)| async move { close_connection(&key, connection, timeout).await });
        join_all(closing).await;

        info!(count, "Database provider shut down");
    }
}

/// Close a pool, giving up after `timeout`
async fn close_connection(key: &str, connection: Connection, timeout: Duration) {
    let connection_name = redact_credentials(key);
    let age = Utc::now() - connection.created_at;
    match tokio::time::timeout(timeout, connection.pool.close()).await {
        Ok(()) => debug!(
            connection = %connection_name,
            age_secs = age.num_seconds(),
            "Connection closed"
        ),
        Err(_) => warn!(
            connection = %connection_name,
            timeout_secs = timeout.as_secs(),
            "Timed out closing connection"
        ),
    }
}

impl std::fmt::Debug for DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseProvider")
            .field("environment", &self.environment)
            .field("url", &redact_credentials(&self.config.url))
            .finish()
    }
}
