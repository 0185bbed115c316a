//! In-memory implementation of UserRepository

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;
use crate::persistence::memory::MemoryState;

use super::trait_::UserRepository;

/// User repository over the in-memory tables
pub struct InMemoryUserRepository {
    state: MemoryState,
}

impl InMemoryUserRepository {
    pub fn new(state: MemoryState) -> Self {
        Self { state }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new(MemoryState::default())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let tables = self.state.read().await?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.trim().to_lowercase();
        let tables = self.state.read().await?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.state.write().await?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict {
                message: format!("Email already registered: {}", user.email),
            });
        }
        if tables.users.contains_key(&user.id) {
            return Err(DomainError::Conflict {
                message: format!("User already exists: {}", user.id),
            });
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.state.write().await?;

        if !tables.users.contains_key(&user.id) {
            return Err(DomainError::not_found("User"));
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(DomainError::Conflict {
                message: format!("Email already registered: {}", user.email),
            });
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.state.write().await?;
        Ok(tables.users.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let tables = self.state.read().await?;
        Ok(tables.users.len() as u64)
    }
}
