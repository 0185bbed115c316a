//! Database context lifecycle

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::container::Container;
use crate::domain::User;
use crate::errors::DomainError;
use crate::persistence::{
    ContextState, DatabaseContext, InMemoryUnitOfWorkProvider, ProviderKind, UnitOfWorkProvider,
    UNIT_OF_WORK_PROVIDER,
};
use crate::repositories::USER_REPOSITORY;

fn memory_provider() -> Arc<dyn UnitOfWorkProvider> {
    Arc::new(InMemoryUnitOfWorkProvider::new())
}

#[tokio::test]
async fn test_operations_fail_fast_before_initialize() {
    let context = DatabaseContext::new(|| async { Ok(memory_provider()) });
    assert_eq!(context.state(), ContextState::Uninitialized);

    let ambient = context.repository(&USER_REPOSITORY);
    assert!(matches!(ambient, Err(DomainError::Configuration { .. })));

    let result = context
        .within_transaction(|_scope| async move { Ok::<_, DomainError>(()) })
        .await;
    match result {
        Err(DomainError::Configuration { message }) => assert!(message.contains("initialize")),
        other => panic!("expected configuration error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_initialize_moves_through_states() {
    let gate = Arc::new(Notify::new());
    let initializer_gate = gate.clone();
    let context = Arc::new(DatabaseContext::new(move || {
        let gate = initializer_gate.clone();
        async move {
            gate.notified().await;
            Ok(memory_provider())
        }
    }));

    let pending = tokio::spawn({
        let context = context.clone();
        async move { context.initialize().await }
    });

    while context.state() != ContextState::Initializing {
        tokio::task::yield_now().await;
    }
    match context.provider() {
        Err(DomainError::Configuration { message }) => assert!(message.contains("initializing")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("provider must not be available while initializing"),
    }

    gate.notify_one();
    pending.await.unwrap().unwrap();

    assert_eq!(context.state(), ContextState::Ready);
    assert_eq!(context.provider_kind(), Some(ProviderKind::InMemory));
}

#[tokio::test]
async fn test_concurrent_initialize_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let context = DatabaseContext::new(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            Ok(memory_provider())
        }
    });

    let (a, b, c) = tokio::join!(context.initialize(), context.initialize(), context.initialize());
    a.unwrap();
    b.unwrap();
    c.unwrap();
    context.initialize().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(context.is_ready());
}

#[tokio::test]
async fn test_failed_initialize_can_be_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let context = DatabaseContext::new(move || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(DomainError::Configuration {
                    message: "database unreachable".to_string(),
                });
            }
            Ok(memory_provider())
        }
    });

    assert!(context.initialize().await.is_err());
    assert_eq!(context.state(), ContextState::Uninitialized);

    context.initialize().await.unwrap();
    assert_eq!(context.state(), ContextState::Ready);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_within_transaction_returns_work_error_unchanged() {
    let context = DatabaseContext::ready(memory_provider());

    let result: Result<(), DomainError> = context
        .within_transaction(|scope| async move {
            let users = scope.repository(&USER_REPOSITORY)?;
            users.create(User::new("kept@example.com", "Kept")).await?;
            Err(DomainError::BusinessRule {
                message: "quiz already submitted".to_string(),
            })
        })
        .await;

    match result {
        Err(DomainError::BusinessRule { message }) => assert_eq!(message, "quiz already submitted"),
        other => panic!("unexpected result: {:?}", other),
    }
    let users = context.repository(&USER_REPOSITORY).unwrap();
    assert_eq!(users.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_within_transaction_supports_caller_error_types() {
    #[derive(Debug)]
    enum HandlerError {
        Domain(DomainError),
    }
    impl From<DomainError> for HandlerError {
        fn from(err: DomainError) -> Self {
            HandlerError::Domain(err)
        }
    }
    impl std::fmt::Display for HandlerError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                HandlerError::Domain(err) => write!(f, "handler failed: {}", err),
            }
        }
    }

    let context = DatabaseContext::ready(memory_provider());
    let result = context
        .within_transaction(|scope| async move {
            let users = scope.repository(&USER_REPOSITORY)?;
            users.create(User::new("one@example.com", "One")).await?;
            users.create(User::new("one@example.com", "Two")).await?;
            Ok::<_, HandlerError>(())
        })
        .await;

    assert!(matches!(
        result,
        Err(HandlerError::Domain(DomainError::Conflict { .. }))
    ));
}

#[tokio::test]
async fn test_initialize_keeps_provider_persistence_error() {
    let container = Container::new();
    container.register(&UNIT_OF_WORK_PROVIDER, |_| async {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        Err::<Arc<dyn UnitOfWorkProvider>, _>(anyhow::Error::from(DomainError::persistence(refused)))
    });

    let context = DatabaseContext::new(move || {
        let container = container.clone();
        async move {
            let provider = container.resolve(&UNIT_OF_WORK_PROVIDER).await?;
            Ok::<_, DomainError>(provider)
        }
    });

    match context.initialize().await {
        Err(DomainError::Persistence(source)) => {
            assert!(source.to_string().contains("connection refused"))
        }
        other => panic!("expected persistence error, got {:?}", other),
    }
}
