//! Per-transaction repository factory.
//!
//! A [`RepositoryRegistry`] maps repository tokens to constructor closures
//! over a backend executor `E`. A [`UnitOfWork`] binds one registry to one
//! executor (a live transaction or the plain pool) and memoizes every
//! repository it builds, so the same token yields the same instance for the
//! lifetime of the unit of work.

use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, Span};

use crate::container::{RepositoryToken, TokenId};
use crate::errors::DomainError;

/// Type-erased repository instance (an `Arc<T>` behind `dyn Any`)
pub type ErasedRepository = Arc<dyn Any + Send + Sync>;

type RepositoryFactory<E> = Arc<dyn Fn(&RepositoryContext<E>) -> ErasedRepository + Send + Sync>;

/// What a repository constructor receives
pub struct RepositoryContext<E> {
    /// Handle every repository of the unit of work executes against
    pub executor: E,
    /// Span of the owning transaction, for repository-level logging
    pub span: Span,
}

/// Token-to-constructor lookup table for one backend
pub struct RepositoryRegistry<E> {
    factories: HashMap<TokenId, (&'static str, RepositoryFactory<E>)>,
}

impl<E> Default for RepositoryRegistry<E> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<E: Send + Sync + 'static> RepositoryRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for a repository kind
    pub fn register<T, F>(mut self, token: &RepositoryToken<T>, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&RepositoryContext<E>) -> Arc<T> + Send + Sync + 'static,
    {
        let erased: RepositoryFactory<E> =
            Arc::new(move |context: &RepositoryContext<E>| -> ErasedRepository {
                Arc::new(factory(context))
            });
        self.factories.insert(token.id(), (token.name(), erased));
        self
    }

    pub fn contains<T: ?Sized>(&self, token: &RepositoryToken<T>) -> bool {
        self.factories.contains_key(&token.id())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Object-safe view of a unit of work
pub trait RepositoryResolver: Send + Sync {
    /// Resolve (building and caching on first use) the repository for `id`
    fn resolve_erased(&self, id: TokenId, name: &'static str)
        -> Result<ErasedRepository, DomainError>;

    /// Names of the repositories resolved so far
    fn touched_repositories(&self) -> Vec<&'static str>;
}

/// Repository cache bound to one executor
pub struct UnitOfWork<E> {
    registry: Arc<RepositoryRegistry<E>>,
    context: RepositoryContext<E>,
    cache: DashMap<TokenId, (&'static str, ErasedRepository)>,
}

impl<E: Send + Sync + 'static> UnitOfWork<E> {
    pub fn new(registry: Arc<RepositoryRegistry<E>>, executor: E, span: Span) -> Self {
        Self {
            registry,
            context: RepositoryContext { executor, span },
            cache: DashMap::new(),
        }
    }

    /// Wrap in a [`TransactionScope`]
    pub fn into_scope(self) -> TransactionScope {
        TransactionScope::new(Arc::new(self))
    }
}

impl<E: Send + Sync + 'static> RepositoryResolver for UnitOfWork<E> {
    fn resolve_erased(
        &self,
        id: TokenId,
        name: &'static str,
    ) -> Result<ErasedRepository, DomainError> {
        if let Some(cached) = self.cache.get(&id) {
            return Ok(cached.1.clone());
        }

        let (_, factory) = self
            .registry
            .factories
            .get(&id)
            .ok_or_else(|| DomainError::UnknownRepository {
                name: name.to_string(),
            })?;

        let entry = self.cache.entry(id).or_insert_with(|| {
            debug!(parent: &self.context.span, repository = name, "Creating repository");
            (name, factory(&self.context))
        });
        Ok(entry.1.clone())
    }

    fn touched_repositories(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.cache.iter().map(|entry| entry.value().0).collect();
        names.sort_unstable();
        names
    }
}

/// Typed access to the repositories of one unit of work
///
/// Cloning shares the underlying unit of work and its cache.
#[derive(Clone)]
pub struct TransactionScope {
    resolver: Arc<dyn RepositoryResolver>,
}

impl TransactionScope {
    pub fn new(resolver: Arc<dyn RepositoryResolver>) -> Self {
        Self { resolver }
    }

    /// Repository for `token`, shared by every call in this scope
    pub fn repository<T>(&self, token: &RepositoryToken<T>) -> Result<Arc<T>, DomainError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let erased = self.resolver.resolve_erased(token.id(), token.name())?;
        erased
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| DomainError::Internal {
                message: format!("Repository {} resolved to an unexpected type", token.name()),
            })
    }

    pub fn touched_repositories(&self) -> Vec<&'static str> {
        self.resolver.touched_repositories()
    }
}

impl std::fmt::Debug for TransactionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionScope")
            .field("repositories", &self.touched_repositories())
            .finish()
    }
}
