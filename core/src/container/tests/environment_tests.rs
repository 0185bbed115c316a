//! Environment snapshot tests

use std::sync::Arc;

use qz_shared::Environment;

use crate::container::{Container, ContainerError, ServiceToken};

trait Backend: Send + Sync {
    fn label(&self) -> &'static str;
}

struct Named(&'static str);

impl Backend for Named {
    fn label(&self) -> &'static str {
        self.0
    }
}

fn backend(label: &'static str) -> Arc<dyn Backend> {
    Arc::new(Named(label))
}

#[tokio::test]
async fn test_environment_snapshots_are_isolated() {
    let container = Container::new();
    let token: ServiceToken<dyn Backend> = ServiceToken::new("Backend");

    container.register_environment_config(Environment::Test, |c| {
        c.register(&token, |_| async { Ok(backend("memory")) });
    });
    container.register_environment_config(Environment::Development, |c| {
        c.register(&token, |_| async { Ok(backend("mysql")) });
    });

    // Configuring an environment does not touch the live registrations
    assert!(!container.has(&token));

    let test = container.for_environment(Environment::Test).unwrap();
    let dev = container.for_environment(Environment::Development).unwrap();

    let in_test = test.resolve(&token).await.unwrap();
    let in_dev = dev.resolve(&token).await.unwrap();

    assert_eq!(in_test.label(), "memory");
    assert_eq!(in_dev.label(), "mysql");
    assert!(!Arc::ptr_eq(&in_test, &in_dev));
}

#[tokio::test]
async fn test_snapshot_starts_from_current_registrations() {
    let container = Container::new();
    let shared: ServiceToken<dyn Backend> = ServiceToken::new("Shared");
    let specific: ServiceToken<dyn Backend> = ServiceToken::new("Specific");

    container.register(&shared, |_| async { Ok(backend("shared")) });
    container.register_environment_config(Environment::Production, |c| {
        c.register(&specific, |_| async { Ok(backend("production")) });
    });

    let production = container.for_environment(Environment::Production).unwrap();
    assert_eq!(production.resolve(&shared).await.unwrap().label(), "shared");
    assert_eq!(production.resolve(&specific).await.unwrap().label(), "production");
}

#[tokio::test]
async fn test_configure_for_environment_discards_singletons() {
    let container = Container::new();
    let token: ServiceToken<dyn Backend> = ServiceToken::new("Backend");

    container.register_environment_config(Environment::Test, |c| {
        c.register(&token, |_| async { Ok(backend("memory")) });
    });
    container.register_environment_config(Environment::Development, |c| {
        c.register(&token, |_| async { Ok(backend("mysql")) });
    });

    container.configure_for_environment(Environment::Test).unwrap();
    let first = container.resolve(&token).await.unwrap();
    assert_eq!(first.label(), "memory");

    container.configure_for_environment(Environment::Development).unwrap();
    assert_eq!(container.resolve(&token).await.unwrap().label(), "mysql");

    container.configure_for_environment(Environment::Test).unwrap();
    let again = container.resolve(&token).await.unwrap();
    assert_eq!(again.label(), "memory");
    assert!(!Arc::ptr_eq(&first, &again));
}

#[tokio::test]
async fn test_unknown_environment_is_rejected() {
    let container = Container::new();

    let err = container
        .configure_for_environment(Environment::Production)
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::EnvironmentNotConfigured {
            environment: Environment::Production
        }
    ));
    assert!(container.for_environment(Environment::Production).is_err());
}
