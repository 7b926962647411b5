//! Single-use auth tokens (email verification, password reset)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What a single-use token is good for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// Single-use token database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// A token is consumable exactly once, before expiry
    pub fn is_usable(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(used: bool, expired: bool) -> AuthToken {
        let now = Utc::now();
        AuthToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            purpose: TokenPurpose::PasswordReset.as_str().to_string(),
            token_hash: "h".to_string(),
            expires_at: if expired {
                now - Duration::minutes(1)
            } else {
                now + Duration::minutes(30)
            },
            used_at: used.then(|| now - Duration::minutes(5)),
            created_at: now - Duration::minutes(10),
        }
    }

    #[test]
    fn test_single_use() {
        assert!(token(false, false).is_usable());
        assert!(!token(true, false).is_usable());
        assert!(!token(false, true).is_usable());
        assert!(!token(true, true).is_usable());
    }
}
