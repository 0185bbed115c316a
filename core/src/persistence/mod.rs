//! Transactional persistence: units of work, providers and the database context.

pub mod context;
pub mod memory;
pub mod provider;
pub mod unit_of_work;

#[cfg(test)]
mod tests;

pub use context::{ContextState, DatabaseContext};
pub use memory::{memory_repository_registry, InMemoryUnitOfWorkProvider, MemoryState, MemoryTables};
pub use provider::{
    ActiveTransaction, ProviderKind, TransactionHandle, UnitOfWorkProvider, UnitOfWorkProviderExt,
};
pub use unit_of_work::{
    ErasedRepository, RepositoryContext, RepositoryRegistry, RepositoryResolver, TransactionScope,
    UnitOfWork,
};

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::container::ServiceToken;

pub static UNIT_OF_WORK_PROVIDER: Lazy<ServiceToken<dyn UnitOfWorkProvider>> =
    Lazy::new(|| ServiceToken::new("UnitOfWorkProvider"));

pub static DATABASE_CONTEXT: Lazy<ServiceToken<DatabaseContext>> =
    Lazy::new(|| ServiceToken::new("DatabaseContext"));

/// A context that is already `Ready` on a fresh in-memory store
pub fn in_memory_context() -> (Arc<DatabaseContext>, Arc<InMemoryUnitOfWorkProvider>) {
    let provider = Arc::new(InMemoryUnitOfWorkProvider::new());
    let context = DatabaseContext::ready(provider.clone());
    (Arc::new(context), provider)
}
