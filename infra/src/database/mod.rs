//! Database module - MySQL implementations using SQLx
//!
//! - Connection pools cached per connection key (`provider`)
//! - Transaction-aware query execution (`executor`)
//! - Repository implementations (`mysql`)
//! - The MySQL unit-of-work provider (`unit_of_work`)

pub mod connection;
pub mod executor;
pub mod mysql;
pub mod provider;
pub mod unit_of_work;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use executor::MySqlExecutor;
pub use provider::{connection_key, ConnectionOptions, ConnectionStats, DatabaseProvider};
pub use unit_of_work::{mysql_repository_registry, MySqlUnitOfWorkProvider};
