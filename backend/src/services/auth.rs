//! Authentication service for user accounts, login and token management

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::User;
use shared::types::{page_offset, PAGE_SIZE};
use shared::validation::{validate_email, validate_password, validate_username};

const USER_COLUMNS: &str = "id, username, email, full_name, is_admin, created_at, updated_at";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new user account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserInput {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub is_admin: Option<bool>,
}

/// Input for logging in with either username or email
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User credential row, never serialized
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    username: String,
    password_hash: String,
    is_admin: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new user account
    pub async fn register(&self, input: RegisterUserInput) -> AppResult<User> {
        if input.full_name.trim().is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        let username = input.username.to_lowercase();
        validate_username(&username).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_email(&input.email).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_password(&input.password).map_err(|e| AppError::Validation(e.to_string()))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(&username)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict(
                "user",
                "User with email or username already exists",
            ));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&username)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(&password_hash)
        .bind(input.is_admin.unwrap_or(false))
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    /// Authenticate with username or email plus password
    pub async fn login(&self, input: LoginInput) -> AppResult<(User, AuthTokens)> {
        if input.username.is_none() && input.email.is_none() {
            return Err(AppError::Validation(
                "username or email is required".to_string(),
            ));
        }

        let credentials = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, password_hash, is_admin FROM users WHERE username = $1 OR email = $2",
        )
        .bind(input.username.as_deref().map(str::to_lowercase))
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(&input.password, &credentials.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::Unauthorized(
                "Invalid user credentials".to_string(),
            ));
        }

        let tokens = self.generate_tokens(
            credentials.id,
            &credentials.username,
            credentials.is_admin,
        )?;
        self.store_refresh_token(credentials.id, &tokens.refresh_token)
            .await?;

        let user = self.current_user(credentials.id).await?;

        Ok((user, tokens))
    }

    /// Rotate tokens using a stored refresh token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let credentials = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, username, password_hash, is_admin FROM users
            WHERE refresh_token_hash = $1 AND refresh_token_expires_at > NOW()
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized("Refresh token is expired or used".to_string())
        })?;

        let tokens = self.generate_tokens(
            credentials.id,
            &credentials.username,
            credentials.is_admin,
        )?;
        self.store_refresh_token(credentials.id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Invalidate the stored refresh token
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL, refresh_token_expires_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Change the current user's password after verifying the old one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let stored = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let valid = verify(old_password, &stored)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::Validation("Invalid old password".to_string()));
        }

        validate_password(new_password).map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = hash(new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Fetch the current user's account
    pub async fn current_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Update the current user's name and email
    pub async fn update_account(
        &self,
        user_id: Uuid,
        full_name: &str,
        email: &str,
    ) -> AppResult<User> {
        if full_name.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }
        validate_email(email).map_err(|e| AppError::Validation(e.to_string()))?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::conflict(
                "user",
                "User with email or username already exists",
            ));
        }

        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET full_name = $1, email = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(full_name)
        .bind(email)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// List one page of accounts visible to the caller, with total count
    ///
    /// Admin accounts other than the caller's own are hidden.
    pub async fn list_page(&self, page: i64, current_user_id: Uuid) -> AppResult<(Vec<User>, i64)> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {} FROM users
            WHERE is_admin = FALSE OR id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        ))
        .bind(current_user_id)
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE is_admin = FALSE OR id = $1",
        )
        .bind(current_user_id)
        .fetch_one(&self.db)
        .await?;

        Ok((users, total))
    }

    /// Delete a user account; self-deletion is rejected
    pub async fn delete(&self, current_user_id: Uuid, target_id: Uuid) -> AppResult<()> {
        if current_user_id == target_id {
            return Err(AppError::Validation(
                "Cannot delete your own account".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(target_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        Ok(())
    }

    /// Generate access and refresh tokens
    fn generate_tokens(
        &self,
        user_id: Uuid,
        username: &str,
        is_admin: bool,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            is_admin,
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token is opaque; only its hash is stored
        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store the refresh token hash on the user row
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let token_hash = hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $1, refresh_token_expires_at = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&token_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

/// SHA-256 + base64 digest of a refresh token for storage
fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    BASE64.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_deterministic() {
        let token = "2d4f9f3e-1f39-4a8f-a9cd-0f2b8a2f6f10";
        assert_eq!(hash_token(token), hash_token(token));
    }

    #[test]
    fn test_hash_token_distinct_inputs() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn test_hash_token_is_not_the_token() {
        let token = "plaintext-refresh-token";
        assert_ne!(hash_token(token), token);
    }
}
