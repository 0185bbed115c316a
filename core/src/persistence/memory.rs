//! In-memory persistence backend for tests and local runs.
//!
//! Committed data lives in one long-lived [`MemoryTables`] value. A
//! transaction takes the writer gate and works on a private copy of the
//! tables. On commit only the rows it changed relative to that copy are
//! applied to the committed tables, so ambient writes made meanwhile
//! survive; rollback drops the copy. Either way the copy is closed and
//! repositories still holding it fail with `TransactionClosed`.
//!
//! Transactions are serialized, and a transaction opened while another one
//! is held by the same task never acquires the gate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    Mutex, OwnedMutexGuard, RwLock, RwLockMappedWriteGuard, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::{debug, info_span};
use uuid::Uuid;

use super::provider::{ActiveTransaction, ProviderKind, TransactionHandle, UnitOfWorkProvider};
use super::unit_of_work::{RepositoryRegistry, TransactionScope, UnitOfWork};
use crate::domain::{Question, QuizSession, User, UserBadge};
use crate::errors::DomainError;
use crate::repositories::{
    BadgeRepository, InMemoryBadgeRepository, InMemoryQuestionRepository,
    InMemoryQuizSessionRepository, InMemoryUserRepository, QuestionRepository,
    QuizSessionRepository, UserRepository, BADGE_REPOSITORY, QUESTION_REPOSITORY,
    QUIZ_SESSION_REPOSITORY, USER_REPOSITORY,
};

/// Every table of the in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub users: HashMap<Uuid, User>,
    pub questions: HashMap<Uuid, Question>,
    pub sessions: HashMap<Uuid, QuizSession>,
    pub badges: HashMap<Uuid, UserBadge>,
}

impl MemoryTables {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.questions.is_empty()
            && self.sessions.is_empty()
            && self.badges.is_empty()
    }
}

/// Executor handed to in-memory repositories
///
/// Cloning shares the same tables. A closed state refuses every access.
#[derive(Debug, Clone)]
pub struct MemoryState {
    tables: Arc<RwLock<Option<MemoryTables>>>,
}

impl MemoryState {
    pub fn new(tables: MemoryTables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Some(tables))),
        }
    }

    pub async fn read(&self) -> Result<RwLockReadGuard<'_, MemoryTables>, DomainError> {
        RwLockReadGuard::try_map(self.tables.read().await, Option::as_ref)
            .map_err(|_| DomainError::TransactionClosed)
    }

    pub async fn write(&self) -> Result<RwLockMappedWriteGuard<'_, MemoryTables>, DomainError> {
        RwLockWriteGuard::try_map(self.tables.write().await, Option::as_mut)
            .map_err(|_| DomainError::TransactionClosed)
    }

    /// Take the tables out, leaving the state closed
    async fn close(&self) -> Option<MemoryTables> {
        self.tables.write().await.take()
    }
}

impl Default for MemoryState {
    fn default() -> Self {
        Self::new(MemoryTables::default())
    }
}

/// Registry of the in-memory repository implementations
pub fn memory_repository_registry() -> RepositoryRegistry<MemoryState> {
    RepositoryRegistry::<MemoryState>::new()
        .register(&USER_REPOSITORY, |ctx| -> Arc<dyn UserRepository> {
            Arc::new(InMemoryUserRepository::new(ctx.executor.clone()))
        })
        .register(&QUESTION_REPOSITORY, |ctx| -> Arc<dyn QuestionRepository> {
            Arc::new(InMemoryQuestionRepository::new(ctx.executor.clone()))
        })
        .register(&QUIZ_SESSION_REPOSITORY, |ctx| -> Arc<dyn QuizSessionRepository> {
            Arc::new(InMemoryQuizSessionRepository::new(ctx.executor.clone()))
        })
        .register(&BADGE_REPOSITORY, |ctx| -> Arc<dyn BadgeRepository> {
            Arc::new(InMemoryBadgeRepository::new(ctx.executor.clone()))
        })
}

pub struct InMemoryUnitOfWorkProvider {
    committed: MemoryState,
    registry: Arc<RepositoryRegistry<MemoryState>>,
    writer: Arc<Mutex<()>>,
}

impl InMemoryUnitOfWorkProvider {
    pub fn new() -> Self {
        Self::with_registry(memory_repository_registry())
    }

    pub fn with_registry(registry: RepositoryRegistry<MemoryState>) -> Self {
        Self {
            committed: MemoryState::default(),
            registry: Arc::new(registry),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Copy of the committed tables
    pub async fn snapshot(&self) -> MemoryTables {
        match self.committed.read().await {
            Ok(tables) => tables.clone(),
            Err(_) => MemoryTables::default(),
        }
    }

    /// Reset every table
    ///
    /// Waits for an open transaction to finish first.
    pub async fn clear(&self) {
        let _gate = self.writer.lock().await;
        if let Ok(mut tables) = self.committed.write().await {
            *tables = MemoryTables::default();
        }
        debug!("In-memory store cleared");
    }
}

impl Default for InMemoryUnitOfWorkProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UnitOfWorkProvider for InMemoryUnitOfWorkProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::InMemory
    }

    async fn begin(&self) -> Result<ActiveTransaction, DomainError> {
        let gate = self.writer.clone().lock_owned().await;
        let base = self.committed.read().await?.clone();
        let working = MemoryState::new(base.clone());

        let span = info_span!("transaction", provider = "in_memory");
        let scope = UnitOfWork::new(self.registry.clone(), working.clone(), span).into_scope();

        Ok(ActiveTransaction {
            scope,
            handle: Box::new(InMemoryTransactionHandle {
                committed: self.committed.clone(),
                base,
                working,
                _gate: gate,
            }),
        })
    }

    fn ambient_scope(&self) -> TransactionScope {
        let span = info_span!("ambient", provider = "in_memory");
        UnitOfWork::new(self.registry.clone(), self.committed.clone(), span).into_scope()
    }
}

struct InMemoryTransactionHandle {
    committed: MemoryState,
    /// Committed tables as they were at `begin`
    base: MemoryTables,
    working: MemoryState,
    _gate: OwnedMutexGuard<()>,
}

#[async_trait]
impl TransactionHandle for InMemoryTransactionHandle {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let working = self.working.close().await.ok_or(DomainError::TransactionClosed)?;
        let mut committed = self.committed.write().await?;

        apply_changes(&mut committed.users, &self.base.users, working.users);
        apply_changes(&mut committed.questions, &self.base.questions, working.questions);
        apply_changes(&mut committed.sessions, &self.base.sessions, working.sessions);
        apply_changes(&mut committed.badges, &self.base.badges, working.badges);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.working.close().await;
        Ok(())
    }
}

/// Apply the rows `working` inserted, changed or removed relative to `base`
fn apply_changes<V: PartialEq>(
    committed: &mut HashMap<Uuid, V>,
    base: &HashMap<Uuid, V>,
    working: HashMap<Uuid, V>,
) {
    for id in base.keys() {
        if !working.contains_key(id) {
            committed.remove(id);
        }
    }
    for (id, row) in working {
        if base.get(&id) != Some(&row) {
            committed.insert(id, row);
        }
    }
}
