//! Storage trait for persistence

use crate::types::{ContactSubmission, NewContactSubmission, NewUser, User};
use crate::Result;
use async_trait::async_trait;

/// Contact-site store
///
/// One capability interface, two interchangeable backings (in-memory and
/// Postgres), selected once at startup. Implementations own their backing
/// store exclusively and are the only place `id` and `created_at` values
/// come from. Lookup misses are `Ok(None)`.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: i32) -> Result<Option<User>>;
    /// Exact match, case-sensitive, no normalization.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn create_contact_submission(
        &self,
        contact: NewContactSubmission,
    ) -> Result<ContactSubmission>;
    /// All submissions, most recent first.
    async fn get_contact_submissions(&self) -> Result<Vec<ContactSubmission>>;
    async fn get_contact_submission(&self, id: i32) -> Result<Option<ContactSubmission>>;
}
