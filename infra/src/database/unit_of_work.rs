//! MySQL unit-of-work provider.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info_span;

use qz_core::errors::DomainError;
use qz_core::persistence::{
    ActiveTransaction, ProviderKind, RepositoryRegistry, TransactionHandle, TransactionScope,
    UnitOfWork, UnitOfWorkProvider,
};
use qz_core::repositories::{
    BadgeRepository, QuestionRepository, QuizSessionRepository, UserRepository, BADGE_REPOSITORY,
    QUESTION_REPOSITORY, QUIZ_SESSION_REPOSITORY, USER_REPOSITORY,
};

use super::connection::DatabasePool;
use super::executor::{MySqlExecutor, SharedTransaction};
use super::mysql::{
    MySqlBadgeRepository, MySqlQuestionRepository, MySqlQuizSessionRepository, MySqlUserRepository,
};

/// Registry of the MySQL repository implementations
pub fn mysql_repository_registry() -> RepositoryRegistry<MySqlExecutor> {
    RepositoryRegistry::<MySqlExecutor>::new()
        .register(&USER_REPOSITORY, |ctx| -> Arc<dyn UserRepository> {
            Arc::new(MySqlUserRepository::new(ctx.executor.clone(), ctx.span.clone()))
        })
        .register(&QUESTION_REPOSITORY, |ctx| -> Arc<dyn QuestionRepository> {
            Arc::new(MySqlQuestionRepository::new(ctx.executor.clone(), ctx.span.clone()))
        })
        .register(&QUIZ_SESSION_REPOSITORY, |ctx| -> Arc<dyn QuizSessionRepository> {
            Arc::new(MySqlQuizSessionRepository::new(ctx.executor.clone(), ctx.span.clone()))
        })
        .register(&BADGE_REPOSITORY, |ctx| -> Arc<dyn BadgeRepository> {
            Arc::new(MySqlBadgeRepository::new(ctx.executor.clone(), ctx.span.clone()))
        })
}

/// Opens MySQL transactions on one pool
pub struct MySqlUnitOfWorkProvider {
    database: Arc<DatabasePool>,
    registry: Arc<RepositoryRegistry<MySqlExecutor>>,
}

impl MySqlUnitOfWorkProvider {
    pub fn new(database: Arc<DatabasePool>) -> Self {
        Self {
            database,
            registry: Arc::new(mysql_repository_registry()),
        }
    }

    pub fn database(&self) -> &Arc<DatabasePool> {
        &self.database
    }
}

#[async_trait]
impl UnitOfWorkProvider for MySqlUnitOfWorkProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MySql
    }

    async fn begin(&self) -> Result<ActiveTransaction, DomainError> {
        let transaction = self
            .database
            .pool()
            .begin()
            .await
            .map_err(DomainError::persistence)?;

        let shared: SharedTransaction = Arc::new(Mutex::new(Some(transaction)));
        let executor = MySqlExecutor::Transaction(shared.clone());

        let span = info_span!("transaction", provider = "mysql");
        let scope = UnitOfWork::new(self.registry.clone(), executor, span).into_scope();

        Ok(ActiveTransaction {
            scope,
            handle: Box::new(MySqlTransactionHandle { transaction: shared }),
        })
    }

    fn ambient_scope(&self) -> TransactionScope {
        let span = info_span!("ambient", provider = "mysql");
        let executor = MySqlExecutor::Pool(self.database.pool().clone());
        UnitOfWork::new(self.registry.clone(), executor, span).into_scope()
    }
}

struct MySqlTransactionHandle {
    transaction: SharedTransaction,
}

#[async_trait]
impl TransactionHandle for MySqlTransactionHandle {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        MySqlExecutor::take_transaction(&self.transaction)
            .await?
            .commit()
            .await
            .map_err(DomainError::persistence)
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        MySqlExecutor::take_transaction(&self.transaction)
            .await?
            .rollback()
            .await
            .map_err(DomainError::persistence)
    }
}
