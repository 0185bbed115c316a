//! Composition root: service registrations per environment.
//!
//! `build_container` registers the services every environment shares and
//! captures one snapshot per [`Environment`]. Callers pick theirs with
//! [`Container::for_environment`]:
//!
//! - `Test`: in-memory unit of work, context initialized by the caller
//! - `Development` / `Production`: MySQL through [`DatabaseProvider`],
//!   context initialized as soon as it is resolved

use once_cell::sync::Lazy;
use std::sync::Arc;

use qz_core::container::{Container, ServiceToken};
use qz_core::errors::DomainError;
use qz_core::persistence::{
    DatabaseContext, InMemoryUnitOfWorkProvider, UnitOfWorkProvider, DATABASE_CONTEXT,
    UNIT_OF_WORK_PROVIDER,
};
use qz_core::services::{Clock, IdGenerator, SystemClock, UuidGenerator, CLOCK, ID_GENERATOR};
use qz_shared::{AppConfig, DatabaseConfig, Environment};

use crate::database::{DatabaseProvider, MySqlUnitOfWorkProvider};

pub static DATABASE_PROVIDER: Lazy<ServiceToken<DatabaseProvider>> =
    Lazy::new(|| ServiceToken::new("DatabaseProvider"));

/// The in-memory store behind the `Test` environment's unit of work
pub static IN_MEMORY_STORE: Lazy<ServiceToken<InMemoryUnitOfWorkProvider>> =
    Lazy::new(|| ServiceToken::new("InMemoryStore"));

/// Container with shared services and a snapshot for every environment
pub fn build_container(config: &AppConfig) -> Container {
    let container = Container::new();

    container.register(&CLOCK, |_| async {
        Ok::<_, anyhow::Error>(Arc::new(SystemClock) as Arc<dyn Clock>)
    });
    container.register(&ID_GENERATOR, |_| async {
        Ok::<_, anyhow::Error>(Arc::new(UuidGenerator) as Arc<dyn IdGenerator>)
    });

    for environment in Environment::ALL {
        let database = config.database.clone();
        container.register_environment_config(environment, move |c| {
            configure_environment(c, environment, database)
        });
    }

    container
}

fn configure_environment(container: &Container, environment: Environment, database: DatabaseConfig) {
    if environment.is_test() {
        container.register(&IN_MEMORY_STORE, |_| async {
            Ok::<_, anyhow::Error>(Arc::new(InMemoryUnitOfWorkProvider::new()))
        });
        container.register(&UNIT_OF_WORK_PROVIDER, |c: Container| async move {
            let store = c.resolve(&IN_MEMORY_STORE).await?;
            Ok::<_, anyhow::Error>(store as Arc<dyn UnitOfWorkProvider>)
        });
    } else {
        container.register(&DATABASE_PROVIDER, move |_| {
            let database = database.clone();
            async move {
                Ok::<_, anyhow::Error>(Arc::new(DatabaseProvider::new(environment, database)))
            }
        });
        container.register(&UNIT_OF_WORK_PROVIDER, |c: Container| async move {
            let provider = c.resolve(&DATABASE_PROVIDER).await?;
            let pool = provider.default_database().await.map_err(DomainError::from)?;
            Ok::<_, anyhow::Error>(
                Arc::new(MySqlUnitOfWorkProvider::new(pool)) as Arc<dyn UnitOfWorkProvider>
            )
        });
    }

    container.register(&DATABASE_CONTEXT, move |c: Container| async move {
        let weak = c.downgrade();
        let context = DatabaseContext::new(move || {
            let weak = weak.clone();
            async move {
                let container = weak.upgrade().ok_or_else(|| DomainError::Configuration {
                    message: "Service container was dropped".to_string(),
                })?;
                let provider = container.resolve(&UNIT_OF_WORK_PROVIDER).await?;
                Ok::<_, DomainError>(provider)
            }
        });

        if environment.initializes_eagerly() {
            context.initialize().await?;
        }
        Ok::<_, anyhow::Error>(Arc::new(context))
    });
}
