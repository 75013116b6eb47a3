//! User types

use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Opaque at this layer; hashing is the auth service's job.
    /// Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Caller-supplied fields for user creation. The store assigns `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}
