//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::roles;

/// User database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub roles: Vec<String>,
    pub is_verified: bool,
    pub totp_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == roles::ADMIN)
    }

    /// Check if user can create and manage contests
    pub fn can_manage_contests(&self) -> bool {
        self.roles
            .iter()
            .any(|r| r == roles::ADMIN || r == roles::ORGANIZER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            display_name: None,
            bio: None,
            country: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_verified: true,
            totp_enabled: false,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_checks() {
        assert!(user_with_roles(&["admin"]).is_admin());
        assert!(!user_with_roles(&["participant"]).is_admin());
        assert!(user_with_roles(&["organizer"]).can_manage_contests());
        assert!(user_with_roles(&["admin"]).can_manage_contests());
        assert!(!user_with_roles(&["participant"]).can_manage_contests());
    }
}
