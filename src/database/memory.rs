use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::bbox;
use super::models::{Cat, CatUpdate, NewCat, NewUserRecord, User, UserChanges};
use super::store::{CatFilter, Store, StoreError};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    cats: Vec<Cat>,
}

/// Process-local store, used by tests and when no database is configured
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
    users
        .iter()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUserRecord) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if email_taken(&tables.users, &user.email, None) {
            return Err(StoreError::Conflict(format!("email {} already in use", user.email)));
        }
        let user = User {
            id: Uuid::new_v4(),
            user_name: user.user_name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if email_taken(&tables.users, email, Some(id)) {
                return Err(StoreError::Conflict(format!("email {} already in use", email)));
            }
        }
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.user_name {
            user.user_name = v;
        }
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
        }
        if let Some(v) = changes.role {
            user.role = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(pos) = tables.users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        let user = tables.users.remove(pos);
        tables.cats.retain(|c| c.owner != id);
        Ok(Some(user))
    }

    async fn insert_cat(&self, owner: Uuid, cat: NewCat) -> Result<Cat, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == owner) {
            return Err(StoreError::Conflict(format!("owner {} does not exist", owner)));
        }
        let cat = Cat {
            id: Uuid::new_v4(),
            cat_name: cat.cat_name,
            weight: cat.weight,
            filename: cat.filename,
            birthdate: cat.birthdate,
            location: cat.location,
            owner,
        };
        tables.cats.push(cat.clone());
        Ok(cat)
    }

    async fn find_cat(&self, id: Uuid) -> Result<Option<Cat>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.cats.iter().find(|c| c.id == id).cloned())
    }

    async fn find_cats(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError> {
        let tables = self.tables.read().await;
        let cats = tables.cats.iter().filter(|c| match filter {
            CatFilter::All => true,
            CatFilter::Owner(owner) => c.owner == *owner,
            CatFilter::Within(region) => bbox::region_contains(region, &c.location),
        });
        Ok(cats.cloned().collect())
    }

    async fn update_cat(&self, id: Uuid, changes: CatUpdate) -> Result<Option<Cat>, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(owner) = changes.owner {
            if !tables.users.iter().any(|u| u.id == owner) {
                return Err(StoreError::Conflict(format!("owner {} does not exist", owner)));
            }
        }
        let Some(cat) = tables.cats.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.cat_name {
            cat.cat_name = v;
        }
        if let Some(v) = changes.weight {
            cat.weight = v;
        }
        if let Some(v) = changes.filename {
            cat.filename = v;
        }
        if let Some(v) = changes.birthdate {
            cat.birthdate = v;
        }
        if let Some(v) = changes.location {
            cat.location = v;
        }
        if let Some(v) = changes.owner {
            cat.owner = v;
        }
        Ok(Some(cat.clone()))
    }

    async fn delete_cat(&self, id: Uuid) -> Result<Option<Cat>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(pos) = tables.cats.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        Ok(Some(tables.cats.remove(pos)))
    }
}
