//! Notification request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{NotificationChannel, NotificationKind};

/// Create/fan-out request (admin only). Carries a single target or a set;
/// at least one must be present.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: Option<Uuid>,
    pub user_ids: Option<Vec<Uuid>>,
    pub kind: NotificationKind,
    pub channel: NotificationChannel,
    #[serde(default = "empty_payload")]
    pub payload: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
}

fn empty_payload() -> serde_json::Value {
    serde_json::json!({})
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub unread_only: Option<bool>,
}

/// Preference upsert. `kind` absent updates the global row.
#[derive(Debug, Deserialize)]
pub struct UpdatePreferenceRequest {
    pub kind: Option<NotificationKind>,
    pub email_enabled: bool,
    pub in_app_enabled: bool,
}
