use std::collections::HashMap;

use async_trait::async_trait;
use tasktrack_core::storage::{RepositoryError, Result, UserRepository};
use tasktrack_core::task::ObjectId;
use tasktrack_core::user::User;
use tokio::sync::RwLock;

/// User repository backed by a map, enforcing username/email uniqueness.
#[derive(Default)]
pub struct MockUsers {
    users: RwLock<HashMap<ObjectId, User>>,
}

#[async_trait]
impl UserRepository for MockUsers {
    async fn get_user(&self, id: ObjectId) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.username.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}
