//! Query executor shared by the MySQL repositories of one unit of work.
//!
//! Repositories built for a transaction all hold a clone of the same
//! [`MySqlExecutor::Transaction`], so their statements run on the one
//! connection that transaction owns. Ambient repositories run straight on
//! the pool.

use sqlx::mysql::{MySqlArguments, MySqlQueryResult, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use qz_core::errors::DomainError;

/// An open transaction, taken out (`None`) once committed or rolled back
pub type SharedTransaction = Arc<Mutex<Option<Transaction<'static, MySql>>>>;

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

#[derive(Clone)]
pub enum MySqlExecutor {
    Pool(MySqlPool),
    Transaction(SharedTransaction),
}

impl MySqlExecutor {
    pub fn is_transactional(&self) -> bool {
        matches!(self, MySqlExecutor::Transaction(_))
    }

    pub async fn execute(&self, query: MySqlQuery<'_>) -> Result<MySqlQueryResult, DomainError> {
        match self {
            MySqlExecutor::Pool(pool) => query.execute(pool).await.map_err(DomainError::persistence),
            MySqlExecutor::Transaction(shared) => {
                let mut guard = shared.lock().await;
                let tx = guard.as_mut().ok_or(DomainError::TransactionClosed)?;
                query.execute(&mut **tx).await.map_err(DomainError::persistence)
            }
        }
    }

    pub async fn fetch_one(&self, query: MySqlQuery<'_>) -> Result<MySqlRow, DomainError> {
        match self {
            MySqlExecutor::Pool(pool) => query.fetch_one(pool).await.map_err(DomainError::persistence),
            MySqlExecutor::Transaction(shared) => {
                let mut guard = shared.lock().await;
                let tx = guard.as_mut().ok_or(DomainError::TransactionClosed)?;
                query.fetch_one(&mut **tx).await.map_err(DomainError::persistence)
            }
        }
    }

    pub async fn fetch_optional(
        &self,
        query: MySqlQuery<'_>,
    ) -> Result<Option<MySqlRow>, DomainError> {
        match self {
            MySqlExecutor::Pool(pool) => query
                .fetch_optional(pool)
                .await
                .map_err(DomainError::persistence),
            MySqlExecutor::Transaction(shared) => {
                let mut guard = shared.lock().await;
                let tx = guard.as_mut().ok_or(DomainError::TransactionClosed)?;
                query
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(DomainError::persistence)
            }
        }
    }

    pub async fn fetch_all(&self, query: MySqlQuery<'_>) -> Result<Vec<MySqlRow>, DomainError> {
        match self {
            MySqlExecutor::Pool(pool) => query.fetch_all(pool).await.map_err(DomainError::persistence),
            MySqlExecutor::Transaction(shared) => {
                let mut guard = shared.lock().await;
                let tx = guard.as_mut().ok_or(DomainError::TransactionClosed)?;
                query.fetch_all(&mut **tx).await.map_err(DomainError::persistence)
            }
        }
    }

    /// Take the transaction out; `TransactionClosed` if it already ended
    pub(crate) async fn take_transaction(
        shared: &SharedTransaction,
    ) -> Result<Transaction<'static, MySql>, DomainError> {
        shared.lock().await.take().ok_or(DomainError::TransactionClosed)
    }
}
