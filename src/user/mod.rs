//! User-lookup collaborator
//!
//! Member identity resolution is owned by an external user service; the
//! coordinator only consumes it. `InMemoryUserLookup` is the standalone and
//! test implementation.

use crate::error::{CoordinatorError, Result};
use crate::types::{User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Resolves usernames and user ids to user records
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_user_by_id(&self, user_id: UserId) -> Result<Option<User>>;
}

/// In-memory user registry
#[derive(Debug, Default)]
pub struct InMemoryUserLookup {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserLookup {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user so later lookups can resolve it
    pub fn register(&self, id: UserId, username: &str) -> Result<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| CoordinatorError::InternalError {
                message: "Failed to acquire users lock".to_string(),
            })?;
        users.insert(
            id,
            User {
                id,
                username: username.to_string(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl UserLookup for InMemoryUserLookup {
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| CoordinatorError::InternalError {
                message: "Failed to acquire users lock".to_string(),
            })?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_id(&self, user_id: UserId) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| CoordinatorError::InternalError {
                message: "Failed to acquire users lock".to_string(),
            })?;
        Ok(users.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_user_resolves_both_ways() {
        let lookup = InMemoryUserLookup::new();
        lookup.register(7, "alice").unwrap();

        let by_name = lookup.get_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, 7);

        let by_id = lookup.get_user_by_id(7).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[tokio::test]
    async fn test_unknown_user_resolves_to_none() {
        let lookup = InMemoryUserLookup::new();
        assert!(lookup.get_user_by_username("ghost").await.unwrap().is_none());
        assert!(lookup.get_user_by_id(99).await.unwrap().is_none());
    }
}
