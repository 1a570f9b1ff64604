use std::sync::Arc;
use uuid::Uuid;

use crate::auth::password::hash_password_blocking;
use crate::auth::Principal;
use crate::database::models::{NewUser, NewUserRecord, Role, User, UserChanges, UserUpdate};
use crate::database::store::Store;
use crate::validation::{normalize_email, validate_new_user, validate_user_update};

use super::{ServiceError, ServiceResult};

/// User registration and account management
pub struct UserService {
    store: Arc<dyn Store>,
    password_rounds: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, password_rounds: u32) -> Self {
        Self {
            store,
            password_rounds,
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", id)))
    }

    /// Register a new account. New accounts always get [`Role::User`].
    pub async fn register(&self, input: NewUser) -> ServiceResult<User> {
        validate_new_user(&input)?;

        let email = normalize_email(&input.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already in use".to_string()));
        }

        let password_hash = hash_password_blocking(input.password, self.password_rounds).await?;
        let user = self
            .store
            .insert_user(NewUserRecord {
                user_name: input.user_name.trim().to_string(),
                email,
                role: Role::User,
                password_hash,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.user_name, user.id);
        Ok(user)
    }

    pub async fn current(&self, principal: &Principal) -> ServiceResult<User> {
        self.store
            .find_user(principal.id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("token not valid".to_string()))
    }

    pub async fn update_current(&self, principal: &Principal, update: UserUpdate) -> ServiceResult<User> {
        validate_user_update(&update)?;

        let password_hash = match update.password {
            Some(password) => Some(hash_password_blocking(password, self.password_rounds).await?),
            None => None,
        };
        let changes = UserChanges {
            user_name: update.user_name.map(|name| name.trim().to_string()),
            email: update.email.as_deref().map(normalize_email),
            password_hash,
            role: None,
        };

        self.store
            .update_user(principal.id, changes)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("token not valid".to_string()))
    }

    /// Delete the current account together with its cats
    pub async fn delete_current(&self, principal: &Principal) -> ServiceResult<User> {
        let user = self
            .store
            .delete_user(principal.id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("token not valid".to_string()))?;

        tracing::info!("Deleted user {} and their cats", user.id);
        Ok(user)
    }

    /// Grant the admin role to the account with this email
    pub async fn promote(&self, email: &str) -> ServiceResult<User> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No user with email '{}'", email)))?;

        let changes = UserChanges {
            role: Some(Role::Admin),
            ..UserChanges::default()
        };
        self.store
            .update_user(user.id, changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No user with email '{}'", email)))
    }
}
