//! Notification model and preference resolution
//!
//! A notification row moves through `created -> delivered -> read`; email
//! delivery failures branch to the terminal `failed` state. Which channel a
//! fan-out targets is resolved from the user's preferences: a per-kind row
//! wins over the global row, which wins over the default of everything
//! enabled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Notification kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ContestStarting,
    ContestEnded,
    RegistrationConfirmed,
    SubmissionJudged,
    SystemAnnouncement,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContestStarting => "contest_starting",
            Self::ContestEnded => "contest_ended",
            Self::RegistrationConfirmed => "registration_confirmed",
            Self::SubmissionJudged => "submission_judged",
            Self::SystemAnnouncement => "system_announcement",
        }
    }
}

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    InApp,
    Both,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::InApp => "in_app",
            Self::Both => "both",
        }
    }

    pub fn wants_email(&self) -> bool {
        matches!(self, Self::Email | Self::Both)
    }

    pub fn wants_in_app(&self) -> bool {
        matches!(self, Self::InApp | Self::Both)
    }
}

/// Delivery state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Created,
    Delivered,
    Read,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }

    /// Legal transitions: created -> delivered -> read, created -> failed.
    /// Everything else is rejected; failed and read are terminal.
    pub fn can_transition_to(&self, next: NotificationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Delivered)
                | (Self::Created, Self::Failed)
                | (Self::Delivered, Self::Read)
        )
    }
}

/// Notification database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub channel: String,
    pub status: String,
    pub payload: serde_json::Value,
    pub error: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A user's channel preferences for one kind (or globally, when kind is None)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: Option<String>,
    pub email_enabled: bool,
    pub in_app_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// Resolve the concrete channel for a fan-out target.
///
/// `requested` is what the caller asked for; the result is what the user
/// actually receives, or None when every requested channel is disabled.
/// A `Both` request degrades to whichever single channel remains enabled.
pub fn resolve_channel(
    requested: NotificationChannel,
    kind: NotificationKind,
    preferences: &[NotificationPreference],
) -> Option<NotificationChannel> {
    let per_kind = preferences
        .iter()
        .find(|p| p.kind.as_deref() == Some(kind.as_str()));
    let global = preferences.iter().find(|p| p.kind.is_none());

    // Per-kind setting beats the global toggle beats default-enabled
    let email_enabled = per_kind
        .map(|p| p.email_enabled)
        .or_else(|| global.map(|p| p.email_enabled))
        .unwrap_or(true);
    let in_app_enabled = per_kind
        .map(|p| p.in_app_enabled)
        .or_else(|| global.map(|p| p.in_app_enabled))
        .unwrap_or(true);

    let email = requested.wants_email() && email_enabled;
    let in_app = requested.wants_in_app() && in_app_enabled;

    match (email, in_app) {
        (true, true) => Some(NotificationChannel::Both),
        (true, false) => Some(NotificationChannel::Email),
        (false, true) => Some(NotificationChannel::InApp),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(kind: Option<&str>, email: bool, in_app: bool) -> NotificationPreference {
        NotificationPreference {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: kind.map(|k| k.to_string()),
            email_enabled: email,
            in_app_enabled: in_app,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_is_enabled_everywhere() {
        let resolved = resolve_channel(
            NotificationChannel::Both,
            NotificationKind::SubmissionJudged,
            &[],
        );
        assert_eq!(resolved, Some(NotificationChannel::Both));
    }

    #[test]
    fn test_global_toggle_applies_without_per_kind_row() {
        let prefs = vec![pref(None, false, true)];
        let resolved = resolve_channel(
            NotificationChannel::Both,
            NotificationKind::ContestStarting,
            &prefs,
        );
        // Both requested, email globally off: degrade to in-app
        assert_eq!(resolved, Some(NotificationChannel::InApp));
    }

    #[test]
    fn test_per_kind_beats_global() {
        let prefs = vec![
            pref(None, false, false),
            pref(Some("contest_starting"), true, false),
        ];
        let resolved = resolve_channel(
            NotificationChannel::Both,
            NotificationKind::ContestStarting,
            &prefs,
        );
        assert_eq!(resolved, Some(NotificationChannel::Email));

        // Another kind still falls through to the (all-off) global row
        let other = resolve_channel(
            NotificationChannel::Both,
            NotificationKind::SubmissionJudged,
            &prefs,
        );
        assert_eq!(other, None);
    }

    #[test]
    fn test_disabled_channel_yields_no_row() {
        let prefs = vec![pref(Some("system_announcement"), false, false)];
        let resolved = resolve_channel(
            NotificationChannel::Email,
            NotificationKind::SystemAnnouncement,
            &prefs,
        );
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_single_channel_request_respects_preference() {
        let prefs = vec![pref(None, true, false)];
        assert_eq!(
            resolve_channel(
                NotificationChannel::InApp,
                NotificationKind::ContestEnded,
                &prefs
            ),
            None
        );
        assert_eq!(
            resolve_channel(
                NotificationChannel::Email,
                NotificationKind::ContestEnded,
                &prefs
            ),
            Some(NotificationChannel::Email)
        );
    }

    #[test]
    fn test_status_transitions_are_linear() {
        use NotificationStatus::*;
        assert!(Created.can_transition_to(Delivered));
        assert!(Created.can_transition_to(Failed));
        assert!(Delivered.can_transition_to(Read));

        // No back-transitions, failed and read are terminal
        assert!(!Delivered.can_transition_to(Created));
        assert!(!Read.can_transition_to(Delivered));
        assert!(!Failed.can_transition_to(Delivered));
        assert!(!Read.can_transition_to(Created));
        assert!(!Created.can_transition_to(Read));
    }
}
