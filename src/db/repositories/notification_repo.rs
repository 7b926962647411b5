//! Notification repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Notification, NotificationPreference, NotificationStatus},
};

/// Repository for notification database operations
pub struct NotificationRepository;

impl NotificationRepository {
    /// Insert a notification row
    pub async fn create(
        pool: &PgPool,
        user_id: &Uuid,
        kind: &str,
        channel: &str,
        status: NotificationStatus,
        payload: &serde_json::Value,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, channel, status, payload, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(channel)
        .bind(status.as_str())
        .bind(payload)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Find notification by ID scoped to its owner
    pub async fn find_for_user(
        pool: &PgPool,
        id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"SELECT * FROM notifications WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Transition a delivery attempt's outcome
    pub async fn set_status(
        pool: &PgPool,
        id: &Uuid,
        status: NotificationStatus,
        error: Option<&serde_json::Value>,
    ) -> AppResult<()> {
        sqlx::query(r#"UPDATE notifications SET status = $2, error = $3 WHERE id = $1"#)
            .bind(id)
            .bind(status.as_str())
            .bind(error)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Flip one row to read; already-read and failed rows stay untouched
    /// (idempotent, and failed is terminal)
    pub async fn mark_read(pool: &PgPool, id: &Uuid, user_id: &Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = $3, read_at = NOW()
            WHERE id = $1 AND user_id = $2 AND read_at IS NULL AND status != 'failed'
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(NotificationStatus::Read.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Flip every unread row for a user; returns how many changed
    pub async fn mark_all_read(pool: &PgPool, user_id: &Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = $2, read_at = NOW()
            WHERE user_id = $1 AND read_at IS NULL AND status != 'failed'
            "#,
        )
        .bind(user_id)
        .bind(NotificationStatus::Read.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count unread, successfully delivered in-app rows. Email-only rows are
    /// 'delivered' once sent but never show in the in-app badge.
    pub async fn unread_count(pool: &PgPool, user_id: &Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE user_id = $1 AND read_at IS NULL AND status = 'delivered'
              AND channel IN ('in_app', 'both')
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// List a user's notifications, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &Uuid,
        offset: i64,
        limit: i64,
        unread_only: bool,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(pool)
        .await?;

        Ok((notifications, total))
    }

    /// All preference rows for a user (global row has kind NULL)
    pub async fn preferences_for_user(
        pool: &PgPool,
        user_id: &Uuid,
    ) -> AppResult<Vec<NotificationPreference>> {
        let preferences = sqlx::query_as::<_, NotificationPreference>(
            r#"SELECT * FROM notification_preferences WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(preferences)
    }

    /// Insert or update one preference row
    pub async fn upsert_preference(
        pool: &PgPool,
        user_id: &Uuid,
        kind: Option<&str>,
        email_enabled: bool,
        in_app_enabled: bool,
    ) -> AppResult<NotificationPreference> {
        let preference = sqlx::query_as::<_, NotificationPreference>(
            r#"
            INSERT INTO notification_preferences (user_id, kind, email_enabled, in_app_enabled)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, kind)
            DO UPDATE SET
                email_enabled = EXCLUDED.email_enabled,
                in_app_enabled = EXCLUDED.in_app_enabled,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(email_enabled)
        .bind(in_app_enabled)
        .fetch_one(pool)
        .await?;

        Ok(preference)
    }

    /// Delete expired rows and stale read rows; returns how many were swept
    pub async fn delete_expired(pool: &PgPool, retention_days: i64) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM notifications
            WHERE (expires_at IS NOT NULL AND expires_at <= NOW())
               OR (read_at IS NOT NULL AND read_at <= NOW() - ($1 * INTERVAL '1 day'))
            "#,
        )
        .bind(retention_days)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
