//! Async service container
//!
//! Maps [`ServiceToken`]s to factories with singleton or transient lifetime.
//! Factories are async and receive the resolving container, so composite
//! services resolve their own dependencies from it.
//!
//! - Concurrent first resolutions of a singleton share one construction:
//!   the factory runs exactly once and every caller gets the same `Arc`.
//! - A failing singleton factory caches nothing; the next `resolve` retries.
//! - Per-environment registration sets are captured as snapshots with
//!   [`Container::register_environment_config`] and either applied in place
//!   ([`Container::configure_for_environment`]) or materialized as a separate
//!   container ([`Container::for_environment`]).
//!
//! Circular dependencies are not detected: a factory that (transitively)
//! resolves its own singleton token waits on itself forever.

mod error;
mod lifetime;
mod token;

#[cfg(test)]
mod tests;

pub use error::ContainerError;
pub use lifetime::Lifetime;
pub use token::{RepositoryToken, ServiceToken, Token, TokenId};

use dashmap::DashMap;
use futures::future::BoxFuture;
use qz_shared::Environment;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type Erased = Arc<dyn Any + Send + Sync>;
type ErasedFactory =
    Arc<dyn Fn(Container) -> BoxFuture<'static, anyhow::Result<Erased>> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    name: &'static str,
    lifetime: Lifetime,
    factory: ErasedFactory,
    instance: Arc<OnceCell<Erased>>,
}

impl Registration {
    /// Same factory and lifetime, empty instance slot
    fn fresh(&self) -> Self {
        Self {
            name: self.name,
            lifetime: self.lifetime,
            factory: self.factory.clone(),
            instance: Arc::new(OnceCell::new()),
        }
    }
}

type Snapshot = Arc<HashMap<TokenId, Registration>>;

#[derive(Default)]
struct ContainerInner {
    registrations: DashMap<TokenId, Registration>,
    environments: DashMap<Environment, Snapshot>,
}

/// Token-keyed async service container
///
/// Cloning is cheap and yields a handle to the same container.
#[derive(Clone, Default)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

/// Non-owning handle, for factories that must not keep their container alive
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<ContainerInner>,
}

impl WeakContainer {
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton factory, replacing any previous registration
    pub fn register<T, F, Fut>(&self, token: &ServiceToken<T>, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<T>>> + Send + 'static,
    {
        self.register_with_lifetime(token, Lifetime::Singleton, factory);
    }

    /// Register a factory invoked on every resolution
    pub fn register_transient<T, F, Fut>(&self, token: &ServiceToken<T>, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<T>>> + Send + 'static,
    {
        self.register_with_lifetime(token, Lifetime::Transient, factory);
    }

    /// Register an already-built instance as a singleton
    pub fn register_instance<T>(&self, token: &ServiceToken<T>, instance: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(token, move |_| {
            let instance = instance.clone();
            async move { Ok(instance) }
        });
    }

    pub fn register_with_lifetime<T, F, Fut>(
        &self,
        token: &ServiceToken<T>,
        lifetime: Lifetime,
        factory: F,
    ) where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(Container) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Arc<T>>> + Send + 'static,
    {
        let factory: ErasedFactory =
            Arc::new(move |container| -> BoxFuture<'static, anyhow::Result<Erased>> {
                let pending = factory(container);
                Box::pin(async move {
                    let service = pending.await?;
                    Ok(Arc::new(service) as Erased)
                })
            });

        let previous = self.inner.registrations.insert(
            token.id(),
            Registration {
                name: token.name(),
                lifetime,
                factory,
                instance: Arc::new(OnceCell::new()),
            },
        );
        if previous.is_some() {
            debug!(service = token.name(), "Replacing existing service registration");
        }
    }

    /// Resolve a service, constructing it if needed
    pub async fn resolve<T>(&self, token: &ServiceToken<T>) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        // Clone out of the map: factories re-enter `resolve` and must not
        // find a shard lock held.
        let registration = self
            .inner
            .registrations
            .get(&token.id())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ContainerError::NotRegistered {
                name: token.name().to_string(),
            })?;

        let erased = match registration.lifetime {
            Lifetime::Singleton => registration
                .instance
                .get_or_try_init(|| self.construct(&registration))
                .await?
                .clone(),
            Lifetime::Transient => self.construct(&registration).await?,
        };

        erased
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| ContainerError::TypeMismatch {
                name: token.name().to_string(),
            })
    }

    async fn construct(&self, registration: &Registration) -> Result<Erased, ContainerError> {
        debug!(
            service = registration.name,
            lifetime = ?registration.lifetime,
            "Constructing service"
        );
        (registration.factory)(self.clone())
            .await
            .map_err(|source| {
                warn!(service = registration.name, error = %source, "Service factory failed");
                ContainerError::Factory {
                    name: registration.name.to_string(),
                    source,
                }
            })
    }

    /// Whether a registration exists for the token
    pub fn has<T: ?Sized>(&self, token: &ServiceToken<T>) -> bool {
        self.inner.registrations.contains_key(&token.id())
    }

    /// Drop every registration, cached instance and environment snapshot
    pub fn clear(&self) {
        self.inner.registrations.clear();
        self.inner.environments.clear();
    }

    /// Names of all registered services, sorted
    pub fn registered_tokens(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .inner
            .registrations
            .iter()
            .map(|entry| entry.value().name)
            .collect();
        names.sort_unstable();
        names
    }

    /// A container with the same factories and lifetimes but no cached
    /// instances; singletons resolved from it are its own.
    pub fn create_child(&self) -> Container {
        let child = Container::new();
        for entry in self.inner.registrations.iter() {
            child
                .inner
                .registrations
                .insert(*entry.key(), entry.value().fresh());
        }
        for entry in self.inner.environments.iter() {
            child
                .inner
                .environments
                .insert(*entry.key(), entry.value().clone());
        }
        child
    }

    /// Capture the registrations an environment should use
    ///
    /// The configurator runs against a scratch child of this container (so it
    /// starts from the current registrations); the live container is left
    /// untouched.
    pub fn register_environment_config<F>(&self, environment: Environment, configurator: F)
    where
        F: FnOnce(&Container),
    {
        let scratch = self.create_child();
        configurator(&scratch);

        let snapshot: HashMap<TokenId, Registration> = scratch
            .inner
            .registrations
            .iter()
            .map(|entry| (*entry.key(), entry.value().fresh()))
            .collect();

        debug!(
            %environment,
            services = snapshot.len(),
            "Captured environment service configuration"
        );
        self.inner.environments.insert(environment, Arc::new(snapshot));
    }

    /// Replace the live registrations with an environment's snapshot
    ///
    /// Every previously cached singleton is discarded.
    pub fn configure_for_environment(&self, environment: Environment) -> Result<(), ContainerError> {
        let snapshot = self.snapshot(environment)?;

        self.inner.registrations.clear();
        for (id, registration) in snapshot.iter() {
            self.inner.registrations.insert(*id, registration.fresh());
        }

        debug!(%environment, "Container configured for environment");
        Ok(())
    }

    /// Build a separate container holding only an environment's snapshot
    pub fn for_environment(&self, environment: Environment) -> Result<Container, ContainerError> {
        let snapshot = self.snapshot(environment)?;

        let container = Container::new();
        for (id, registration) in snapshot.iter() {
            container
                .inner
                .registrations
                .insert(*id, registration.fresh());
        }
        Ok(container)
    }

    /// Non-owning handle to this container
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn snapshot(&self, environment: Environment) -> Result<Snapshot, ContainerError> {
        self.inner
            .environments
            .get(&environment)
            .map(|entry| entry.value().clone())
            .ok_or(ContainerError::EnvironmentNotConfigured { environment })
    }
}
