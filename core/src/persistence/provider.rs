//! Transaction boundary abstraction shared by every persistence backend.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

use super::unit_of_work::TransactionScope;
use crate::errors::DomainError;

/// Backend family behind a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    MySql,
    InMemory,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::MySql => "mysql",
            ProviderKind::InMemory => "in_memory",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finishes one open transaction; consumed by either call
#[async_trait]
pub trait TransactionHandle: Send {
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// An open transaction: its repositories plus the handle that ends it
pub struct ActiveTransaction {
    pub scope: TransactionScope,
    pub handle: Box<dyn TransactionHandle>,
}

/// Source of transactional and ambient repository scopes
#[async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Open a transaction with a fresh unit of work bound to it
    async fn begin(&self) -> Result<ActiveTransaction, DomainError>;

    /// A fresh, non-transactional unit of work
    fn ambient_scope(&self) -> TransactionScope;
}

/// Commit-on-success wrapper over [`UnitOfWorkProvider::begin`]
#[async_trait]
pub trait UnitOfWorkProviderExt: UnitOfWorkProvider {
    /// Run `work` inside one transaction
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
    /// A failed rollback is logged; the error from `work` is what the caller
    /// sees.
    async fn execute<T, E, F, Fut>(&self, work: F) -> Result<T, E>
    where
        T: Send,
        E: From<DomainError> + Send,
        F: FnOnce(TransactionScope) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send;
}

#[async_trait]
impl<P> UnitOfWorkProviderExt for P
where
    P: UnitOfWorkProvider + ?Sized,
{
    async fn execute<T, E, F, Fut>(&self, work: F) -> Result<T, E>
    where
        T: Send,
        E: From<DomainError> + Send,
        F: FnOnce(TransactionScope) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        let ActiveTransaction { scope, handle } = self.begin().await?;
        debug!(provider = %self.kind(), "Transaction started");

        match work(scope).await {
            Ok(value) => {
                handle.commit().await?;
                debug!(provider = %self.kind(), "Transaction committed");
                Ok(value)
            }
            Err(err) => {
                match handle.rollback().await {
                    Ok(()) => debug!(provider = %self.kind(), "Transaction rolled back"),
                    Err(rollback_err) => warn!(
                        provider = %self.kind(),
                        error = %rollback_err,
                        "Transaction rollback failed"
                    ),
                }
                Err(err)
            }
        }
    }
}
