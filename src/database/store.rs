use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::bbox::Region;
use super::models::{Cat, CatUpdate, NewCat, NewUserRecord, User, UserChanges};

/// Errors from a [`Store`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint hit, e.g. an email already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored data that cannot be mapped back onto the model
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] super::manager::DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which cats a query should return
#[derive(Debug, Clone)]
pub enum CatFilter {
    All,
    Owner(Uuid),
    /// Cats whose location lies within (or on the edge of) the region
    Within(Region),
}

/// Persistence for users and cats.
///
/// Lists come back in insertion order. Updates and deletes return `None`
/// when the id does not exist. Deleting a user deletes the user's cats.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn insert_user(&self, user: NewUserRecord) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn insert_cat(&self, owner: Uuid, cat: NewCat) -> Result<Cat, StoreError>;
    async fn find_cat(&self, id: Uuid) -> Result<Option<Cat>, StoreError>;
    async fn find_cats(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError>;
    async fn update_cat(&self, id: Uuid, changes: CatUpdate) -> Result<Option<Cat>, StoreError>;
    async fn delete_cat(&self, id: Uuid) -> Result<Option<Cat>, StoreError>;
}
