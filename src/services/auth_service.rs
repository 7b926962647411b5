//! Authentication and session service
//!
//! Access tokens are short-lived signed JWTs; refresh tokens are opaque
//! values bound to a server-side session row through their hash. Rotation
//! happens inside a transaction so a replayed refresh token can never mint
//! a second pair.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    clients::EmailTransport,
    config::JwtConfig,
    constants::{OPAQUE_TOKEN_LENGTH, roles},
    db::repositories::{AuthTokenRepository, SessionRepository, UserRepository},
    error::{AppError, AppResult},
    models::{DeviceInfo, Session, TokenPurpose, User},
    utils::crypto::{generate_secure_token, hash_token},
};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub roles: Vec<String>,
    pub sid: String, // session_id
    pub exp: i64,
    pub iat: i64,
}

/// Token pair handed to the client after login/refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub session_id: Uuid,
}

/// Authentication service
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
    mailer: Arc<dyn EmailTransport>,
}

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtConfig, mailer: Arc<dyn EmailTransport>) -> Self {
        Self { db, jwt, mailer }
    }

    /// Register a new user and open their first session
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        display_name: Option<&str>,
        device: &DeviceInfo,
    ) -> AppResult<(User, TokenPair)> {
        if UserRepository::username_taken(&self.db, username).await? {
            return Err(AppError::AlreadyExists("Username already taken".to_string()));
        }

        if UserRepository::email_taken(&self.db, email).await? {
            return Err(AppError::AlreadyExists("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;

        let user = UserRepository::create(
            &self.db,
            username,
            email,
            &password_hash,
            display_name,
            &[roles::PARTICIPANT.to_string()],
        )
        .await?;

        // Verification email is best-effort; registration stands either way
        if let Err(e) = self.issue_verification_email(&user).await {
            tracing::warn!(user_id = %user.id, "Failed to send verification email: {}", e);
        }

        let tokens = self.open_session(&user, device).await?;

        Ok((user, tokens))
    }

    /// Login with username/email and password
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        device: &DeviceInfo,
    ) -> AppResult<(User, TokenPair)> {
        let user = UserRepository::find_by_identifier(&self.db, identifier)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        UserRepository::update_last_login(&self.db, &user.id).await?;

        let tokens = self.open_session(&user, device).await?;

        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new pair, rotating the stored hash.
    ///
    /// The session row is locked for the duration of the transaction, so of
    /// two concurrent calls with the same token exactly one rotates; the
    /// other no longer finds the old hash and fails with `SessionNotFound`.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(User, TokenPair)> {
        let presented_hash = hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        let session = SessionRepository::find_by_hash_for_update(&mut tx, &presented_hash)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        if session.is_expired() {
            SessionRepository::delete_in_tx(&mut tx, &session.id).await?;
            tx.commit().await?;
            return Err(AppError::RefreshTokenExpired);
        }

        let new_refresh_token = generate_secure_token(OPAQUE_TOKEN_LENGTH);
        let new_expires_at = Utc::now() + Duration::days(self.jwt.refresh_token_expiry_days);

        let session = SessionRepository::rotate(
            &mut tx,
            &session.id,
            &hash_token(&new_refresh_token),
            new_expires_at,
        )
        .await?;

        tx.commit().await?;

        let user = UserRepository::find_by_id(&self.db, &session.user_id)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        let (access_token, expires_in) = self.generate_access_token(&user, &session.id)?;

        Ok((
            user,
            TokenPair {
                access_token,
                refresh_token: new_refresh_token,
                expires_in,
                session_id: session.id,
            },
        ))
    }

    /// Delete one session; deleting an absent session is not an error
    pub async fn logout(&self, user_id: &Uuid, session_id: &Uuid) -> AppResult<()> {
        SessionRepository::delete(&self.db, session_id, user_id).await
    }

    /// Delete every session for the user, returning how many were revoked
    pub async fn logout_all(&self, user_id: &Uuid) -> AppResult<u64> {
        SessionRepository::delete_all_for_user(&self.db, user_id).await
    }

    /// List the user's sessions for device management
    pub async fn list_sessions(&self, user_id: &Uuid) -> AppResult<Vec<Session>> {
        SessionRepository::list_for_user(&self.db, user_id).await
    }

    /// Consume an email-verification token
    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        let record = AuthTokenRepository::find_by_hash(
            &self.db,
            TokenPurpose::EmailVerification,
            &hash_token(token),
        )
        .await?
        .ok_or(AppError::InvalidToken)?;

        if !record.is_usable() {
            return Err(AppError::TokenExpired);
        }

        if !AuthTokenRepository::consume(&self.db, &record.id).await? {
            return Err(AppError::InvalidToken);
        }

        UserRepository::mark_verified(&self.db, &record.user_id).await
    }

    /// Create and email a password-reset token. Responds identically whether
    /// or not the address is registered.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let Some(user) = UserRepository::find_by_email(&self.db, email).await? else {
            return Ok(());
        };

        // A new request supersedes outstanding tokens
        AuthTokenRepository::invalidate_for_user(&self.db, &user.id, TokenPurpose::PasswordReset)
            .await?;

        let token = generate_secure_token(OPAQUE_TOKEN_LENGTH);
        let expires_at = Utc::now() + Duration::minutes(self.jwt.reset_token_expiry_minutes);

        AuthTokenRepository::create(
            &self.db,
            &user.id,
            TokenPurpose::PasswordReset,
            &hash_token(&token),
            expires_at,
        )
        .await?;

        let body = format!(
            "Hello {},\n\nUse this token to reset your password within {} minutes:\n\n{}\n\n\
             If you did not request a reset, you can ignore this message.",
            user.username, self.jwt.reset_token_expiry_minutes, token
        );

        if let Err(e) = self
            .mailer
            .send(&user.email, "Reset your password", &body)
            .await
        {
            tracing::warn!(user_id = %user.id, "Failed to send reset email: {}", e);
        }

        Ok(())
    }

    /// Consume a reset token, set the new password, and revoke all sessions
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let record = AuthTokenRepository::find_by_hash(
            &self.db,
            TokenPurpose::PasswordReset,
            &hash_token(token),
        )
        .await?
        .ok_or(AppError::InvalidToken)?;

        if !record.is_usable() {
            return Err(AppError::TokenExpired);
        }

        if !AuthTokenRepository::consume(&self.db, &record.id).await? {
            return Err(AppError::InvalidToken);
        }

        let password_hash = hash_password(new_password)?;
        UserRepository::update_password_hash(&self.db, &record.user_id, &password_hash).await?;

        // Existing devices must log in again with the new password
        SessionRepository::delete_all_for_user(&self.db, &record.user_id).await?;

        Ok(())
    }

    /// Get user by ID
    pub async fn get_user_by_id(&self, user_id: &Uuid) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&self.db, user_id).await
    }

    /// Verify JWT token and extract claims
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Create the session row and both tokens for a fresh login
    async fn open_session(&self, user: &User, device: &DeviceInfo) -> AppResult<TokenPair> {
        let refresh_token = generate_secure_token(OPAQUE_TOKEN_LENGTH);
        let expires_at = Utc::now() + Duration::days(self.jwt.refresh_token_expiry_days);

        let session = SessionRepository::create(
            &self.db,
            &user.id,
            &hash_token(&refresh_token),
            device.device_name.as_deref(),
            device.user_agent.as_deref(),
            device.ip_address.as_deref(),
            expires_at,
        )
        .await?;

        let (access_token, expires_in) = self.generate_access_token(user, &session.id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in,
            session_id: session.id,
        })
    }

    async fn issue_verification_email(&self, user: &User) -> AppResult<()> {
        let token = generate_secure_token(OPAQUE_TOKEN_LENGTH);
        let expires_at = Utc::now() + Duration::hours(self.jwt.verification_token_expiry_hours);

        AuthTokenRepository::create(
            &self.db,
            &user.id,
            TokenPurpose::EmailVerification,
            &hash_token(&token),
            expires_at,
        )
        .await?;

        let body = format!(
            "Welcome to CodeArena, {}!\n\nVerify your email with this token:\n\n{}",
            user.username, token
        );

        self.mailer
            .send(&user.email, "Verify your email", &body)
            .await
    }

    /// Generate access token
    fn generate_access_token(&self, user: &User, session_id: &Uuid) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let expires_in = self.jwt.access_token_expiry_minutes * 60;
        let expires_at = now + Duration::minutes(self.jwt.access_token_expiry_minutes);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            roles: user.roles.clone(),
            sid: session_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))?;

        Ok((token, expires_in))
    }
}

/// Hash a password using Argon2
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(hash)
}

/// Verify a password against its stored hash
pub(crate) fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("Sup3rSecret").expect("hashing succeeds");
        assert!(verify_password("Sup3rSecret", &hash).expect("verification runs"));
        assert!(!verify_password("wrong", &hash).expect("verification runs"));
    }

    #[test]
    fn test_claims_expiry_is_in_the_future() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "alice".to_string(),
            roles: vec!["participant".to_string()],
            sid: Uuid::new_v4().to_string(),
            exp: (now + Duration::minutes(15)).timestamp(),
            iat: now.timestamp(),
        };
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }
}
