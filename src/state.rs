use std::sync::Arc;

use crate::auth::AuthKeys;
use crate::config::AppConfig;
use crate::database::store::Store;
use crate::services::{CatService, UserService};

/// Shared handler state: the store plus the immutable auth settings
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub keys: AuthKeys,
    pub password_rounds: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keys: AuthKeys, password_rounds: u32) -> Self {
        Self {
            store,
            keys,
            password_rounds,
        }
    }

    pub fn from_config(store: Arc<dyn Store>, config: &AppConfig) -> Self {
        Self::new(
            store,
            AuthKeys::from_config(&config.security),
            config.security.password_rounds,
        )
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone(), self.password_rounds)
    }

    pub fn cats(&self) -> CatService {
        CatService::new(self.store.clone())
    }
}
