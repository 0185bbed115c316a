//! Database context: the entry point request handlers use for persistence.
//!
//! A context is built around a required provider source. It starts
//! `Uninitialized`; [`DatabaseContext::initialize`] moves it through
//! `Initializing` to `Ready`, and every persistence call before that fails
//! fast instead of waiting.

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use super::provider::{ProviderKind, UnitOfWorkProvider, UnitOfWorkProviderExt};
use super::unit_of_work::TransactionScope;
use crate::container::RepositoryToken;
use crate::errors::DomainError;

type ProviderFuture = BoxFuture<'static, Result<Arc<dyn UnitOfWorkProvider>, DomainError>>;
type ProviderInitializer = Box<dyn Fn() -> ProviderFuture + Send + Sync>;

/// Lifecycle of a [`DatabaseContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    Initializing,
    Ready,
}

pub struct DatabaseContext {
    initializer: ProviderInitializer,
    provider: OnceCell<Arc<dyn UnitOfWorkProvider>>,
    initializing: AtomicUsize,
}

struct InitializingGuard<'a>(&'a AtomicUsize);

impl<'a> InitializingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DatabaseContext {
    /// Context whose provider is obtained by `initializer` on `initialize`
    pub fn new<F, Fut>(initializer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn UnitOfWorkProvider>, DomainError>> + Send + 'static,
    {
        Self {
            initializer: Box::new(move || -> ProviderFuture { Box::pin(initializer()) }),
            provider: OnceCell::new(),
            initializing: AtomicUsize::new(0),
        }
    }

    /// Context that is `Ready` from the start
    pub fn ready(provider: Arc<dyn UnitOfWorkProvider>) -> Self {
        let source = provider.clone();
        Self {
            initializer: Box::new(move || -> ProviderFuture {
                let provider = source.clone();
                Box::pin(async move { Ok(provider) })
            }),
            provider: OnceCell::from(provider),
            initializing: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> ContextState {
        if self.provider.initialized() {
            ContextState::Ready
        } else if self.initializing.load(Ordering::SeqCst) > 0 {
            ContextState::Initializing
        } else {
            ContextState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ContextState::Ready
    }

    /// Obtain the provider; idempotent
    ///
    /// Concurrent callers share a single initialization. On failure the
    /// context returns to `Uninitialized` and may be initialized again.
    pub async fn initialize(&self) -> Result<(), DomainError> {
        if self.provider.initialized() {
            return Ok(());
        }

        let _guard = InitializingGuard::enter(&self.initializing);
        let result = self
            .provider
            .get_or_try_init(|| async {
                info!("Initializing database context");
                (self.initializer)().await
            })
            .await;

        match result {
            Ok(provider) => {
                info!(provider = %provider.kind(), "Database context ready");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Database context initialization failed");
                Err(err)
            }
        }
    }

    /// The provider, or a configuration error naming why it is unavailable
    pub fn provider(&self) -> Result<Arc<dyn UnitOfWorkProvider>, DomainError> {
        if let Some(provider) = self.provider.get() {
            return Ok(provider.clone());
        }

        let message = match self.state() {
            ContextState::Initializing => {
                "Database context is still initializing; await initialize() before use"
            }
            _ => "Database context is not initialized; call initialize() before use",
        };
        Err(DomainError::Configuration {
            message: message.to_string(),
        })
    }

    pub fn provider_kind(&self) -> Option<ProviderKind> {
        self.provider.get().map(|provider| provider.kind())
    }

    /// Run `work` in one transaction
    ///
    /// Every repository obtained from the scope shares the transaction.
    /// `Ok` commits, `Err` rolls back; the error is logged together with the
    /// repositories the work touched and returned unchanged.
    pub async fn within_transaction<T, E, F, Fut>(&self, work: F) -> Result<T, E>
    where
        T: Send,
        E: From<DomainError> + fmt::Display + Send,
        F: FnOnce(TransactionScope) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        let provider = self.provider()?;
        let touched: Arc<once_cell::sync::OnceCell<Vec<&'static str>>> = Arc::default();
        let recorder = touched.clone();

        let result = provider
            .execute(move |scope| async move {
                let observed = scope.clone();
                let outcome = work(scope).await;
                if outcome.is_err() {
                    let _ = recorder.set(observed.touched_repositories());
                }
                outcome
            })
            .await;

        if let Err(err) = &result {
            let repositories = touched.get().cloned().unwrap_or_default();
            error!(
                provider = %provider.kind(),
                error = %err,
                repositories = ?repositories,
                "Transaction failed"
            );
        }
        result
    }

    /// Repository outside any transaction
    ///
    /// Each call builds a fresh unit of work; nothing is cached between calls.
    pub fn repository<T>(&self, token: &RepositoryToken<T>) -> Result<Arc<T>, DomainError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.provider()?.ambient_scope().repository(token)
    }
}

impl fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("state", &self.state())
            .field("provider", &self.provider_kind())
            .finish()
    }
}
