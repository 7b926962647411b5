//! Notification response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Notification, NotificationPreference};

/// One notification row
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: String,
    pub channel: String,
    pub status: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            channel: notification.channel,
            status: notification.status,
            payload: notification.payload,
            created_at: notification.created_at,
            read_at: notification.read_at,
            expires_at: notification.expires_at,
        }
    }
}

/// Unread counter payload
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// One preference row
#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub kind: Option<String>,
    pub email_enabled: bool,
    pub in_app_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<NotificationPreference> for PreferenceResponse {
    fn from(preference: NotificationPreference) -> Self {
        Self {
            kind: preference.kind,
            email_enabled: preference.email_enabled,
            in_app_enabled: preference.in_app_enabled,
            updated_at: preference.updated_at,
        }
    }
}
