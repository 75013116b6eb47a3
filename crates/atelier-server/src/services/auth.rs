//! Authentication service
//!
//! Owns password hashing and token issuance so the storage layer only ever
//! sees opaque hashes.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use atelier_core::{NewUser, Storage, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const TOKEN_LIFETIME_DAYS: i64 = 7;

pub struct AuthService {
    storage: Arc<dyn Storage>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(storage: Arc<dyn Storage>, jwt_secret: String) -> Self {
        Self {
            storage,
            jwt_secret,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(User, String)> {
        // Hash password
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        // Create user in storage; a duplicate username surfaces as
        // AtelierError::UniqueViolation inside the anyhow chain.
        let user = self
            .storage
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        let token = self.issue_token(user.id)?;
        Ok((user, token))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String)> {
        let user = self.storage.get_user_by_username(username).await?;

        if let Some(user) = user {
            // Verify password
            let parsed_hash = PasswordHash::new(&user.password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
            let argon2 = Argon2::default();

            if argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
            {
                let token = self.issue_token(user.id)?;
                return Ok((user, token));
            }
        }

        anyhow::bail!("Invalid credentials")
    }

    pub fn validate_token(&self, token: &str) -> Result<i32> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        let user_id = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid subject claim"))?;
        Ok(user_id)
    }

    fn issue_token(&self, user_id: i32) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::days(TOKEN_LIFETIME_DAYS);
        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id
    exp: i64,    // expiration time
    iat: i64,    // issued at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use atelier_core::AtelierError;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStorage::new()),
            "test-secret".to_string(),
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();

        let (user, _token) = auth.register("admin", "hunter22").await.unwrap();
        assert_eq!(user.username, "admin");
        // The stored hash is never the plaintext password
        assert_ne!(user.password_hash, "hunter22");

        let (logged_in, token) = auth.login("admin", "hunter22").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.validate_token(&token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let auth = service();

        auth.register("admin", "hunter22").await.unwrap();
        assert!(auth.login("admin", "wrong").await.is_err());
        assert!(auth.login("nobody", "hunter22").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_unique_violation() {
        let auth = service();

        auth.register("admin", "hunter22").await.unwrap();
        let err = auth.register("admin", "other-pass").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AtelierError>(),
            Some(AtelierError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_validate_rejects_garbage_token() {
        let auth = service();
        assert!(auth.validate_token("not-a-jwt").is_err());
    }
}
