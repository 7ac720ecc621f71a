//! In-memory user repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use commons_core::domain::User;
use commons_core::error::StoreError;
use commons_core::ports::{BaseRepository, UserRepository};

/// Profiles keyed by id. Usernames and emails are unique among live profiles.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        for other in users.values().filter(|u| u.id != user.id && !u.deleted) {
            if other.username == user.username {
                return Err(StoreError::Constraint(format!(
                    "username '{}' is taken",
                    user.username
                )));
            }
            if other.email.eq_ignore_ascii_case(&user.email) {
                return Err(StoreError::Constraint("email is already registered".into()));
            }
        }

        // A deleted profile gives up its username to the newcomer
        users.retain(|id, u| *id == user.id || !(u.deleted && u.username == user.username));

        if users.contains_key(&user.id) {
            user.updated_at = chrono::Utc::now();
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.username == username)
            .min_by_key(|u| u.deleted)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| !u.deleted && u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}
