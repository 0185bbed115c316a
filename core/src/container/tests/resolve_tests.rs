//! Resolution and lifetime tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::container::{Container, ContainerError, Lifetime, ServiceToken};

trait Counter: Send + Sync {
    fn serial(&self) -> usize;
}

struct Numbered(usize);

impl Counter for Numbered {
    fn serial(&self) -> usize {
        self.0
    }
}

static COUNTER: Lazy<ServiceToken<dyn Counter>> = Lazy::new(|| ServiceToken::new("Counter"));

fn counting_factory(
    calls: Arc<AtomicUsize>,
) -> impl Fn(Container) -> futures::future::BoxFuture<'static, anyhow::Result<Arc<dyn Counter>>>
       + Send
       + Sync
       + 'static {
    move |_: Container| -> futures::future::BoxFuture<'static, anyhow::Result<Arc<dyn Counter>>> {
        let calls = calls.clone();
        Box::pin(async move {
            let serial = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Arc::new(Numbered(serial)) as Arc<dyn Counter>)
        })
    }
}

#[tokio::test]
async fn test_singleton_resolves_same_instance() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    container.register(&COUNTER, counting_factory(calls.clone()));

    let first = container.resolve(&COUNTER).await.unwrap();
    let second = container.resolve(&COUNTER).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_first_resolution_runs_factory_once() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let factory_calls = calls.clone();
    container.register(&COUNTER, move |_| {
        let calls = factory_calls.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let serial = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Arc::new(Numbered(serial)) as Arc<dyn Counter>)
        }
    });

    let (a, b, c) = tokio::join!(
        container.resolve(&COUNTER),
        container.resolve(&COUNTER),
        container.resolve(&COUNTER),
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
}

#[tokio::test]
async fn test_concurrent_resolution_across_tasks() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let factory_calls = calls.clone();
    container.register(&COUNTER, move |_| {
        let calls = factory_calls.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Numbered(7)) as Arc<dyn Counter>)
        }
    });

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve(&COUNTER).await.unwrap() })
        })
        .collect();

    let resolved = futures::future::join_all(handles).await;
    let first = resolved[0].as_ref().unwrap().clone();
    for service in resolved {
        assert!(Arc::ptr_eq(&first, &service.unwrap()));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_builds_distinct_instances() {
    let container = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    container.register_transient(&COUNTER, counting_factory(calls.clone()));

    let first = container.resolve(&COUNTER).await.unwrap();
    let second = container.resolve(&COUNTER).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.serial(), 1);
    assert_eq!(second.serial(), 2);
}

#[tokio::test]
async fn test_failed_singleton_is_retried() {
    let container = Container::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let factory_attempts = attempts.clone();
    container.register(&COUNTER, move |_| {
        let attempts = factory_attempts.clone();
        async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("database not reachable yet");
            }
            Ok(Arc::new(Numbered(2)) as Arc<dyn Counter>)
        }
    });

    let err = match container.resolve(&COUNTER).await {
        Err(err) => err,
        Ok(_) => panic!("first resolution should fail"),
    };
    assert!(matches!(err, ContainerError::Factory { ref name, .. } if name == "Counter"));
    assert!(err.to_string().contains("database not reachable yet"));

    let service = container.resolve(&COUNTER).await.unwrap();
    assert_eq!(service.serial(), 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    let again = container.resolve(&COUNTER).await.unwrap();
    assert!(Arc::ptr_eq(&service, &again));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unregistered_token_names_the_token() {
    let container = Container::new();
    let token: ServiceToken<dyn Counter> = ServiceToken::new("MissingCounter");

    let err = match container.resolve(&token).await {
        Err(err) => err,
        Ok(_) => panic!("resolution should fail"),
    };

    assert!(matches!(err, ContainerError::NotRegistered { .. }));
    assert!(err.to_string().contains("MissingCounter"));
}

#[tokio::test]
async fn test_tokens_with_same_name_are_distinct_keys() {
    let container = Container::new();
    let first: ServiceToken<dyn Counter> = ServiceToken::new("Counter");
    let second: ServiceToken<dyn Counter> = ServiceToken::new("Counter");

    container.register_instance(&first, Arc::new(Numbered(1)) as Arc<dyn Counter>);

    assert!(container.has(&first));
    assert!(!container.has(&second));
    assert!(container.resolve(&second).await.is_err());
}

#[tokio::test]
async fn test_factories_resolve_dependencies() {
    struct Doubled(Arc<dyn Counter>);
    impl Counter for Doubled {
        fn serial(&self) -> usize {
            self.0.serial() * 2
        }
    }

    let container = Container::new();
    let base: ServiceToken<dyn Counter> = ServiceToken::new("Base");
    let doubled: ServiceToken<dyn Counter> = ServiceToken::new("Doubled");

    container.register_instance(&base, Arc::new(Numbered(21)) as Arc<dyn Counter>);
    container.register(&doubled, move |c: Container| async move {
        let inner = c.resolve(&base).await?;
        Ok::<_, anyhow::Error>(Arc::new(Doubled(inner)) as Arc<dyn Counter>)
    });

    assert_eq!(container.resolve(&doubled).await.unwrap().serial(), 42);
}

#[tokio::test]
async fn test_register_overwrites_previous_registration() {
    let container = Container::new();
    container.register_instance(&COUNTER, Arc::new(Numbered(1)) as Arc<dyn Counter>);
    container.register_with_lifetime(&COUNTER, Lifetime::Transient, |_| async {
        Ok(Arc::new(Numbered(9)) as Arc<dyn Counter>)
    });

    assert_eq!(container.resolve(&COUNTER).await.unwrap().serial(), 9);
}

#[tokio::test]
async fn test_child_container_has_its_own_singletons() {
    let parent = Container::new();
    let calls = Arc::new(AtomicUsize::new(0));
    parent.register(&COUNTER, counting_factory(calls.clone()));

    let from_parent = parent.resolve(&COUNTER).await.unwrap();
    let child = parent.create_child();
    let from_child = child.resolve(&COUNTER).await.unwrap();

    assert!(!Arc::ptr_eq(&from_parent, &from_child));
    assert!(Arc::ptr_eq(&from_parent, &parent.resolve(&COUNTER).await.unwrap()));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_and_registered_tokens() {
    let container = Container::new();
    let zeta: ServiceToken<dyn Counter> = ServiceToken::new("Zeta");
    let alpha: ServiceToken<dyn Counter> = ServiceToken::new("Alpha");
    container.register_instance(&zeta, Arc::new(Numbered(1)) as Arc<dyn Counter>);
    container.register_instance(&alpha, Arc::new(Numbered(2)) as Arc<dyn Counter>);

    assert_eq!(container.registered_tokens(), vec!["Alpha", "Zeta"]);

    container.clear();
    assert!(container.registered_tokens().is_empty());
    assert!(!container.has(&alpha));
}

#[tokio::test]
async fn test_weak_container_does_not_keep_container_alive() {
    let container = Container::new();
    let weak = container.downgrade();
    assert!(weak.upgrade().is_some());

    drop(container);
    assert!(weak.upgrade().is_none());
}
