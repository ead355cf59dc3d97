//! In-memory user repository for tests

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseResult;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::UserRepository;
use crate::models::{NewUser, User};

#[derive(Default, Clone)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn create_if_absent(&self, new_user: &NewUser) -> DatabaseResult<bool> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&new_user.username) {
            return Ok(false);
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.insert(user.username.clone(), user);
        Ok(true)
    }
}
