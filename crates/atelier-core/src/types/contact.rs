//! Contact submission types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored contact-form submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Assigned by the storage layer at insertion time.
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new submission. The store assigns `id`
/// and `created_at`; there is no way to supply them here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_serializes_all_fields() {
        let submission = ContactSubmission {
            id: 1,
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            subject: "General Inquiry".to_string(),
            message: "Hi".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Jane Doe");
        assert_eq!(json["email"], "jane@x.com");
        assert_eq!(json["subject"], "General Inquiry");
        assert_eq!(json["message"], "Hi");
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn new_submission_has_no_generated_fields() {
        let json = serde_json::to_value(NewContactSubmission {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            subject: "General Inquiry".to_string(),
            message: "Hi".to_string(),
        })
        .unwrap();

        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
    }
}
