//! In-memory storage using DashMap (no persistence across restarts)

use atelier_core::{
    AtelierError, ContactSubmission, NewContactSubmission, NewUser, Result, Storage, User,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI32, Ordering};

/// Ephemeral `Storage` implementation backed by process memory.
///
/// Ids come from per-table counters starting at 1. Username uniqueness is
/// enforced here too, so both backends satisfy the same contract and tests
/// against this one exercise production semantics.
pub struct MemoryStorage {
    users: DashMap<i32, User>,
    // username -> id index; doubles as the uniqueness guard
    usernames: DashMap<String, i32>,
    submissions: DashMap<i32, ContactSubmission>,
    next_user_id: AtomicI32,
    next_submission_id: AtomicI32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            submissions: DashMap::new(),
            next_user_id: AtomicI32::new(1),
            next_submission_id: AtomicI32::new(1),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: i32) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let id = match self.usernames.get(username) {
            Some(r) => *r.value(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        // The entry guard holds the username shard, so the uniqueness check
        // and the reservation are one atomic step even under concurrent
        // registrations.
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AtelierError::UniqueViolation(format!(
                "username already taken: {}",
                user.username
            ))),
            Entry::Vacant(slot) => {
                let id = self.next_user_id.fetch_add(1, Ordering::SeqCst);
                let record = User {
                    id,
                    username: user.username,
                    password_hash: user.password_hash,
                };
                // Publish the record before the index so a reader that wins
                // the race never sees an id it cannot resolve.
                self.users.insert(id, record.clone());
                slot.insert(id);
                Ok(record)
            }
        }
    }

    async fn create_contact_submission(
        &self,
        contact: NewContactSubmission,
    ) -> Result<ContactSubmission> {
        let id = self.next_submission_id.fetch_add(1, Ordering::SeqCst);
        let record = ContactSubmission {
            id,
            name: contact.name,
            email: contact.email,
            subject: contact.subject,
            message: contact.message,
            created_at: Utc::now(),
        };
        self.submissions.insert(id, record.clone());
        Ok(record)
    }

    async fn get_contact_submissions(&self) -> Result<Vec<ContactSubmission>> {
        let mut all: Vec<ContactSubmission> = self
            .submissions
            .iter()
            .map(|r| r.value().clone())
            .collect();
        // Most recent first; equal timestamps fall back to id so the order
        // is at least deterministic.
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn get_contact_submission(&self, id: i32) -> Result<Option<ContactSubmission>> {
        Ok(self.submissions.get(&id).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    fn inquiry(message: &str) -> NewContactSubmission {
        NewContactSubmission {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            subject: "General Inquiry".to_string(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_ids_strictly_increase() {
        let storage = MemoryStorage::new();

        let mut last_id = 0;
        for name in ["alice", "bob", "carol"] {
            let user = storage.create_user(new_user(name)).await.unwrap();
            assert!(user.id > last_id);
            last_id = user.id;
        }
    }

    #[tokio::test]
    async fn test_get_user_returns_created_record() {
        let storage = MemoryStorage::new();

        let created = storage.create_user(new_user("alice")).await.unwrap();
        let fetched = storage.get_user(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_get_user_by_username() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get_user_by_username("alice").await.unwrap(), None);

        let created = storage.create_user(new_user("alice")).await.unwrap();
        let fetched = storage.get_user_by_username("alice").await.unwrap();
        assert_eq!(fetched, Some(created));

        // Case-sensitive, no normalization
        assert_eq!(storage.get_user_by_username("Alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_user_is_none_not_error() {
        let storage = MemoryStorage::new();
        storage.create_user(new_user("alice")).await.unwrap();

        assert_eq!(storage.get_user(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let storage = MemoryStorage::new();

        storage.create_user(new_user("admin")).await.unwrap();
        let err = storage.create_user(new_user("admin")).await.unwrap_err();
        assert!(matches!(err, AtelierError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_registration_single_winner() {
        let storage = Arc::new(MemoryStorage::new());

        let a = tokio::spawn({
            let storage = storage.clone();
            async move { storage.create_user(new_user("admin")).await }
        });
        let b = tokio::spawn({
            let storage = storage.clone();
            async move { storage.create_user(new_user("admin")).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AtelierError::UniqueViolation(_)))));
    }

    #[tokio::test]
    async fn test_submission_roundtrip_and_sequential_ids() {
        let storage = MemoryStorage::new();

        let before = Utc::now();
        let first = storage
            .create_contact_submission(inquiry("Hi"))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "Jane Doe");
        assert_eq!(first.email, "jane@x.com");
        assert_eq!(first.subject, "General Inquiry");
        assert_eq!(first.message, "Hi");
        assert!(first.created_at >= before);

        let second = storage
            .create_contact_submission(inquiry("Hi"))
            .await
            .unwrap();
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);

        assert_eq!(
            storage.get_contact_submission(1).await.unwrap(),
            Some(first)
        );
        assert_eq!(
            storage.get_contact_submission(2).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_submissions_listed_newest_first() {
        let storage = MemoryStorage::new();

        for message in ["first message", "second message", "third message"] {
            storage
                .create_contact_submission(inquiry(message))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let all = storage.get_contact_submissions().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "third message");
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_missing_submission_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_contact_submission(42).await.unwrap(), None);
    }
}
