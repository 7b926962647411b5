//! Session repository
//!
//! Rotation-sensitive lookups take a transaction connection and lock the row
//! so two concurrent refresh calls cannot both succeed from the same stored
//! hash.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{error::AppResult, models::Session};

/// Repository for session database operations
pub struct SessionRepository;

impl SessionRepository {
    /// Create a new session
    pub async fn create(
        pool: &PgPool,
        user_id: &Uuid,
        refresh_token_hash: &str,
        device_name: Option<&str>,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (
                user_id, refresh_token_hash, device_name, user_agent, ip_address, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(refresh_token_hash)
        .bind(device_name)
        .bind(user_agent)
        .bind(ip_address)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Look up a session by refresh token hash, locking the row for the
    /// remainder of the transaction
    pub async fn find_by_hash_for_update(
        conn: &mut PgConnection,
        refresh_token_hash: &str,
    ) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"SELECT * FROM sessions WHERE refresh_token_hash = $1 FOR UPDATE"#,
        )
        .bind(refresh_token_hash)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(session)
    }

    /// Swap in a new refresh token hash and extend the session
    pub async fn rotate(
        conn: &mut PgConnection,
        id: &Uuid,
        new_refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET refresh_token_hash = $2, last_used_at = NOW(), expires_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_refresh_token_hash)
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(session)
    }

    /// Delete a session within a transaction
    pub async fn delete_in_tx(conn: &mut PgConnection, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM sessions WHERE id = $1"#)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Delete one session; absent rows are fine (logout is idempotent)
    pub async fn delete(pool: &PgPool, id: &Uuid, user_id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM sessions WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete all sessions for a user, returning how many were revoked
    pub async fn delete_all_for_user(pool: &PgPool, user_id: &Uuid) -> AppResult<u64> {
        let result = sqlx::query(r#"DELETE FROM sessions WHERE user_id = $1"#)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// List a user's sessions, most recently used first
    pub async fn list_for_user(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"SELECT * FROM sessions WHERE user_id = $1 ORDER BY last_used_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Delete sessions past expiry; returns how many were swept
    pub async fn delete_expired(pool: &PgPool) -> AppResult<u64> {
        let result = sqlx::query(r#"DELETE FROM sessions WHERE expires_at <= NOW()"#)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
