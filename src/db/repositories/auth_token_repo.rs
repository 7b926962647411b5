//! Single-use auth token repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{AuthToken, TokenPurpose},
};

/// Repository for verification/reset token operations
pub struct AuthTokenRepository;

impl AuthTokenRepository {
    /// Create a token for a user
    pub async fn create(
        pool: &PgPool,
        user_id: &Uuid,
        purpose: TokenPurpose,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<AuthToken> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, purpose, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Find a token by hash and purpose
    pub async fn find_by_hash(
        pool: &PgPool,
        purpose: TokenPurpose,
        token_hash: &str,
    ) -> AppResult<Option<AuthToken>> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"SELECT * FROM auth_tokens WHERE purpose = $1 AND token_hash = $2"#,
        )
        .bind(purpose.as_str())
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Mark a token consumed; returns false if it was already used
    /// (the guard in the WHERE clause keeps consumption single-use)
    pub async fn consume(pool: &PgPool, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE auth_tokens SET used_at = NOW() WHERE id = $1 AND used_at IS NULL"#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Invalidate any outstanding tokens of one purpose for a user
    pub async fn invalidate_for_user(
        pool: &PgPool,
        user_id: &Uuid,
        purpose: TokenPurpose,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_tokens SET used_at = NOW()
            WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Delete consumed or expired tokens; returns how many were swept
    pub async fn delete_expired(pool: &PgPool) -> AppResult<u64> {
        let result = sqlx::query(
            r#"DELETE FROM auth_tokens WHERE expires_at <= NOW() OR used_at IS NOT NULL"#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
