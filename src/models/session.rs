//! Session model
//!
//! A session binds the hash of an opaque refresh token to a user and device.
//! The plaintext token is only ever held by the client; rotation replaces
//! the stored hash in place so the session id is stable across refreshes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Session database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub device_name: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Device metadata captured at login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceInfo {
    pub device_name: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_token_hash: "h".to_string(),
            device_name: None,
            user_agent: None,
            ip_address: None,
            created_at: now - Duration::days(1),
            last_used_at: now,
            expires_at: now + Duration::days(29),
        };
        assert!(!session.is_expired());

        let expired = Session {
            expires_at: now - Duration::seconds(1),
            ..session
        };
        assert!(expired.is_expired());
    }
}
