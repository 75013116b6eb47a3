//! Contact form handlers
//!
//! The public submit endpoint validates and shapes the payload before it
//! reaches the storage port; the read endpoints are for the admin dashboard
//! and require a Bearer token.

use crate::AppState;
use atelier_core::{ContactSubmission, NewContactSubmission};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    name: String,
    email: String,
    subject: String,
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactCreatedResponse {
    message: String,
    data: ContactSubmission,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    data: Vec<ContactSubmission>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    data: ContactSubmission,
}

/// JSON error response
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Vec<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            errors: Vec::new(),
        }
    }

    fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation error".to_string(),
            errors,
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Missing or invalid token")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.errors.is_empty() {
            json!({ "message": self.message })
        } else {
            json!({ "message": self.message, "errors": self.errors })
        };
        (self.status, Json(body)).into_response()
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Resolve the Bearer token to an existing user, or 401.
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<i32, ApiError> {
    let token = extract_token(headers).ok_or_else(ApiError::unauthorized)?;

    let user_id = state
        .auth_service
        .validate_token(token)
        .map_err(|_| ApiError::unauthorized())?;

    match state.storage.get_user(user_id).await {
        Ok(Some(user)) => Ok(user.id),
        Ok(None) => Err(ApiError::unauthorized()),
        Err(e) => {
            error!("Failed to resolve token user: {}", e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing your request",
            ))
        }
    }
}

/// Field checks mirroring the public form's rules.
fn validate(req: &ContactRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if req.name.chars().count() < 2 {
        errors.push("Name must be at least 2 characters.".to_string());
    }
    if !is_valid_email(&req.email) {
        errors.push("Please enter a valid email address.".to_string());
    }
    if req.subject.chars().count() < 3 {
        errors.push("Subject must be at least 3 characters.".to_string());
    }
    if req.message.chars().count() < 10 {
        errors.push("Message must be at least 10 characters.".to_string());
    }

    errors
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactCreatedResponse>), ApiError> {
    let errors = validate(&req);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let submission = state
        .storage
        .create_contact_submission(NewContactSubmission {
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
        })
        .await
        .map_err(|e| {
            error!("Failed to store contact submission: {}", e);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while processing your request",
            )
        })?;

    info!(
        "Stored contact submission {} from {}",
        submission.id, submission.email
    );

    Ok((
        StatusCode::CREATED,
        Json(ContactCreatedResponse {
            message: "Contact form submitted successfully".to_string(),
            data: submission,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SubmissionListResponse>, ApiError> {
    authorize(&state, &headers).await?;

    match state.storage.get_contact_submissions().await {
        Ok(submissions) => Ok(Json(SubmissionListResponse { data: submissions })),
        Err(e) => {
            error!("Failed to list contact submissions: {}", e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while fetching contact submissions",
            ))
        }
    }
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<SubmissionResponse>, ApiError> {
    authorize(&state, &headers).await?;

    match state.storage.get_contact_submission(id).await {
        Ok(Some(submission)) => Ok(Json(SubmissionResponse { data: submission })),
        Ok(None) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Contact submission not found",
        )),
        Err(e) => {
            error!("Failed to fetch contact submission {}: {}", id, e);
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while fetching the contact submission",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, subject: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let req = request("Jane Doe", "jane@x.com", "General Inquiry", "Hello there!");
        assert!(validate(&req).is_empty());
    }

    #[test]
    fn test_each_field_is_checked() {
        let req = request("J", "not-an-email", "Hi", "short");
        let errors = validate(&req);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email("a.b@sub.domain.org"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("jane@nodot"));
        assert!(!is_valid_email("jane@.com"));
        assert!(!is_valid_email("jane@x.com."));
    }
}
