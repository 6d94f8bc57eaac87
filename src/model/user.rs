use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Opaque identifier for a user account.
///
/// The core never interprets the contents; it is whatever the identity
/// provider hands out (a username, a UUID string, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Roles a caller can hold.
///
/// Ordinary accounts hold [`Role::User`]; administrators additionally hold
/// [`Role::Admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}
