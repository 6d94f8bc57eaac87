//! Identity provider seam.
//!
//! The core consumes a single capability from the identity layer: resolve a
//! caller id to `{exists, roles}`. Credential checking, password hashing and
//! session management live outside this crate; [`Directory`] is the
//! in-memory implementation used by tests and embedders.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{Role, UserId};

/// A resolved caller: who they are and what roles they hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: UserId,
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, roles: impl Into<Vec<Role>>) -> Self {
        Self {
            id: id.into(),
            roles: roles.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Errors from the identity layer itself. An unknown caller is not an
/// error here; it resolves to `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IdentityError {
    /// The provider could not be reached. Transient; safe to retry.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves caller ids to identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the identity for `id`, or `None` if no such user exists.
    async fn resolve(&self, id: &UserId) -> Result<Option<Identity>, IdentityError>;
}

/// In-memory identity provider. Built once, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: HashMap<UserId, Identity>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user with the given roles. Builder-style.
    pub fn with_user(mut self, id: impl Into<UserId>, roles: impl Into<Vec<Role>>) -> Self {
        let id = id.into();
        self.users
            .insert(id.clone(), Identity::new(id, roles.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for Directory {
    async fn resolve(&self, id: &UserId) -> Result<Option<Identity>, IdentityError> {
        Ok(self.users.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_users_with_roles() {
        let directory = Directory::new()
            .with_user("alice", [Role::User])
            .with_user("root", [Role::User, Role::Admin]);
        assert_eq!(directory.len(), 2);
        assert!(!directory.is_empty());

        let alice = directory
            .resolve(&UserId::from("alice"))
            .await
            .unwrap()
            .expect("alice should exist");
        assert!(!alice.is_admin());

        let root = directory
            .resolve(&UserId::from("root"))
            .await
            .unwrap()
            .expect("root should exist");
        assert!(root.is_admin());
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_none() {
        let directory = Directory::new().with_user("alice", [Role::User]);
        let missing = directory.resolve(&UserId::from("mallory")).await.unwrap();
        assert!(missing.is_none());
    }
}
