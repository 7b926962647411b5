//! Notification service
//!
//! Fan-out: one request targets one or many users; each target's channel is
//! resolved against their preferences before a row is written. In-app rows
//! are delivered the moment they exist; email rows go through the SMTP
//! transport and record failures instead of propagating them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    clients::EmailTransport,
    db::repositories::{NotificationRepository, UserRepository},
    error::{AppError, AppResult},
    models::{
        Notification, NotificationChannel, NotificationKind, NotificationPreference,
        NotificationStatus, resolve_channel,
    },
};

/// A fan-out request
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: Option<Uuid>,
    pub user_ids: Option<Vec<Uuid>>,
    pub kind: NotificationKind,
    pub channel: NotificationChannel,
    pub payload: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateNotification {
    /// Collect the distinct target set; empty is a caller error
    fn targets(&self) -> Vec<Uuid> {
        let mut targets: Vec<Uuid> = self
            .user_id
            .into_iter()
            .chain(self.user_ids.iter().flatten().copied())
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }
}

/// Notification service
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
    mailer: Arc<dyn EmailTransport>,
}

impl NotificationService {
    pub fn new(db: PgPool, mailer: Arc<dyn EmailTransport>) -> Self {
        Self { db, mailer }
    }

    /// Fan a notification out to every target user, honoring preferences.
    /// Returns the rows actually created (targets with every requested
    /// channel disabled get none).
    pub async fn create(&self, request: &CreateNotification) -> AppResult<Vec<Notification>> {
        let targets = request.targets();
        if targets.is_empty() {
            return Err(AppError::Validation(
                "Either user_id or user_ids must be provided".to_string(),
            ));
        }

        let created = futures::future::try_join_all(
            targets.iter().map(|target| self.fan_out_to(target, request)),
        )
        .await?;

        Ok(created.into_iter().flatten().collect())
    }

    async fn fan_out_to(
        &self,
        user_id: &Uuid,
        request: &CreateNotification,
    ) -> AppResult<Option<Notification>> {
        let preferences: Vec<NotificationPreference> =
            NotificationRepository::preferences_for_user(&self.db, user_id).await?;

        let Some(channel) = resolve_channel(request.channel, request.kind, &preferences) else {
            tracing::debug!(user_id = %user_id, kind = request.kind.as_str(),
                "All requested channels disabled, skipping");
            return Ok(None);
        };

        // In-app-only rows are delivered by existing; email needs a send
        let initial_status = if channel.wants_email() {
            NotificationStatus::Created
        } else {
            NotificationStatus::Delivered
        };

        let notification = NotificationRepository::create(
            &self.db,
            user_id,
            request.kind.as_str(),
            channel.as_str(),
            initial_status,
            &request.payload,
            request.expires_at,
        )
        .await?;

        let notification = if channel.wants_email() {
            self.deliver_email(notification, request).await?
        } else {
            notification
        };

        Ok(Some(notification))
    }

    /// Attempt SMTP delivery and record the outcome on the row
    async fn deliver_email(
        &self,
        mut notification: Notification,
        request: &CreateNotification,
    ) -> AppResult<Notification> {
        let user = UserRepository::find_by_id(&self.db, &notification.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let subject = email_subject(request.kind);
        let body = email_body(request.kind, &request.payload, &user.username);

        match self.mailer.send(&user.email, subject, &body).await {
            Ok(()) => {
                NotificationRepository::set_status(
                    &self.db,
                    &notification.id,
                    NotificationStatus::Delivered,
                    None,
                )
                .await?;
                notification.status = NotificationStatus::Delivered.as_str().to_string();
            }
            Err(e) => {
                tracing::warn!(notification_id = %notification.id,
                    "Email delivery failed: {}", e);
                let error = json!({ "message": e.to_string() });
                NotificationRepository::set_status(
                    &self.db,
                    &notification.id,
                    NotificationStatus::Failed,
                    Some(&error),
                )
                .await?;
                notification.status = NotificationStatus::Failed.as_str().to_string();
                notification.error = Some(error);
            }
        }

        Ok(notification)
    }

    /// Idempotent read flip; unknown ids owned by others come back NotFound
    pub async fn mark_read(&self, id: &Uuid, user_id: &Uuid) -> AppResult<()> {
        NotificationRepository::find_for_user(&self.db, id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        NotificationRepository::mark_read(&self.db, id, user_id).await
    }

    /// Flip every unread row; returns how many changed
    pub async fn mark_all_read(&self, user_id: &Uuid) -> AppResult<u64> {
        NotificationRepository::mark_all_read(&self.db, user_id).await
    }

    /// Count of delivered, unread in-app rows
    pub async fn unread_count(&self, user_id: &Uuid) -> AppResult<i64> {
        NotificationRepository::unread_count(&self.db, user_id).await
    }

    /// List a user's notifications
    pub async fn list(
        &self,
        user_id: &Uuid,
        page: u32,
        per_page: u32,
        unread_only: bool,
    ) -> AppResult<(Vec<Notification>, i64)> {
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        NotificationRepository::list_for_user(&self.db, user_id, offset, limit, unread_only).await
    }

    /// All preference rows for a user
    pub async fn preferences(&self, user_id: &Uuid) -> AppResult<Vec<NotificationPreference>> {
        NotificationRepository::preferences_for_user(&self.db, user_id).await
    }

    /// Create or update one preference row (kind None = the global row)
    pub async fn update_preference(
        &self,
        user_id: &Uuid,
        kind: Option<NotificationKind>,
        email_enabled: bool,
        in_app_enabled: bool,
    ) -> AppResult<NotificationPreference> {
        NotificationRepository::upsert_preference(
            &self.db,
            user_id,
            kind.map(|k| k.as_str()),
            email_enabled,
            in_app_enabled,
        )
        .await
    }
}

fn email_subject(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::ContestStarting => "Your contest is starting soon",
        NotificationKind::ContestEnded => "Contest finished",
        NotificationKind::RegistrationConfirmed => "Registration confirmed",
        NotificationKind::SubmissionJudged => "Your submission was judged",
        NotificationKind::SystemAnnouncement => "CodeArena announcement",
    }
}

fn email_body(kind: NotificationKind, payload: &serde_json::Value, username: &str) -> String {
    let detail = payload
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default();

    match kind {
        NotificationKind::ContestStarting => format!(
            "Hi {},\n\nA contest you registered for starts soon. {}",
            username, detail
        ),
        NotificationKind::ContestEnded => format!(
            "Hi {},\n\nA contest you participated in has ended. {}",
            username, detail
        ),
        NotificationKind::RegistrationConfirmed => format!(
            "Hi {},\n\nYour contest registration is confirmed. {}",
            username, detail
        ),
        NotificationKind::SubmissionJudged => format!(
            "Hi {},\n\nYour submission has been judged. {}",
            username, detail
        ),
        NotificationKind::SystemAnnouncement => format!("Hi {},\n\n{}", username, detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_deduplicated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let request = CreateNotification {
            user_id: Some(a),
            user_ids: Some(vec![b, a, b]),
            kind: NotificationKind::SystemAnnouncement,
            channel: NotificationChannel::InApp,
            payload: json!({}),
            expires_at: None,
        };

        let targets = request.targets();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&a));
        assert!(targets.contains(&b));
    }

    #[test]
    fn test_empty_target_set_is_detected() {
        let request = CreateNotification {
            user_id: None,
            user_ids: Some(vec![]),
            kind: NotificationKind::SystemAnnouncement,
            channel: NotificationChannel::InApp,
            payload: json!({}),
            expires_at: None,
        };
        assert!(request.targets().is_empty());
    }

    #[test]
    fn test_email_body_includes_payload_message() {
        let body = email_body(
            NotificationKind::SubmissionJudged,
            &json!({ "message": "Verdict: accepted" }),
            "alice",
        );
        assert!(body.contains("alice"));
        assert!(body.contains("Verdict: accepted"));
    }
}
