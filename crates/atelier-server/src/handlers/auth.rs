//! Authentication handlers

use crate::AppState;
use atelier_core::AtelierError;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    access_token: String,
    user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    id: i32,
    username: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, StatusCode> {
    info!("Registration attempt for: {}", req.username);

    // Validate username length
    if req.username.chars().count() < 3 {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Validate password length
    if req.password.len() < 6 {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (user, access_token) = state
        .auth_service
        .register(&req.username, &req.password)
        .await
        .map_err(|e| {
            if matches!(
                e.downcast_ref::<AtelierError>(),
                Some(AtelierError::UniqueViolation(_))
            ) {
                return StatusCode::CONFLICT;
            }
            error!("Registration error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    info!("Registration successful for: {}", user.username);

    Ok(Json(AuthResponse {
        access_token,
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, StatusCode> {
    info!("Login attempt for: {}", req.username);

    let (user, access_token) = state
        .auth_service
        .login(&req.username, &req.password)
        .await
        .map_err(|e| {
            error!("Login error: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    info!("Login successful for: {}", user.username);

    Ok(Json(AuthResponse {
        access_token,
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    }))
}
