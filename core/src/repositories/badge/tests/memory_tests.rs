//! Unit tests for the in-memory badge repository

use uuid::Uuid;

use crate::domain::entities::badge::{UserBadge, WELCOME_BADGE};
use crate::errors::DomainError;
use crate::repositories::badge::{BadgeRepository, InMemoryBadgeRepository};

#[tokio::test]
async fn test_award_and_lookup() {
    let repo = InMemoryBadgeRepository::default();
    let user_id = Uuid::new_v4();

    repo.award(UserBadge::new(user_id, WELCOME_BADGE)).await.unwrap();

    assert!(repo.has_badge(user_id, WELCOME_BADGE).await.unwrap());
    assert!(!repo.has_badge(user_id, "streak-7").await.unwrap());
    assert!(!repo.has_badge(Uuid::new_v4(), WELCOME_BADGE).await.unwrap());
    assert_eq!(repo.find_by_user(user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_award_conflicts() {
    let repo = InMemoryBadgeRepository::default();
    let user_id = Uuid::new_v4();
    repo.award(UserBadge::new(user_id, WELCOME_BADGE)).await.unwrap();

    let result = repo.award(UserBadge::new(user_id, WELCOME_BADGE)).await;
    assert!(matches!(result, Err(DomainError::Conflict { .. })));

    // Another user may hold the same badge
    repo.award(UserBadge::new(Uuid::new_v4(), WELCOME_BADGE))
        .await
        .unwrap();
}
