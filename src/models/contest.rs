//! Contest model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Contest database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Contest {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub problem_ids: Vec<Uuid>,
    pub allowed_languages: Vec<String>,
    pub max_participants: Option<i32>,
    pub max_submissions_per_problem: i32,
    pub points_per_problem: i32,
    pub penalty_per_wrong_minutes: i32,
    pub freeze_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contest {
    /// Current status, always derived from the clock
    pub fn status(&self) -> ContestStatus {
        self.status_at(Utc::now())
    }

    /// Status at a given instant
    pub fn status_at(&self, now: DateTime<Utc>) -> ContestStatus {
        if now < self.start_time {
            ContestStatus::Upcoming
        } else if now < self.end_time {
            ContestStatus::Live
        } else {
            ContestStatus::Ended
        }
    }

    /// Check if registration is open
    pub fn is_registration_open(&self) -> bool {
        self.is_registration_open_at(Utc::now())
    }

    /// Registration window check at a given instant. Without an explicit
    /// window, registration stays open until the contest ends.
    pub fn is_registration_open_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(start) = self.registration_start {
            if now < start {
                return false;
            }
        }

        if let Some(end) = self.registration_end {
            if now > end {
                return false;
            }
        }

        now < self.end_time
    }

    /// The instant standings stop updating publicly, if a freeze is configured
    pub fn freeze_time(&self) -> Option<DateTime<Utc>> {
        self.freeze_minutes
            .map(|m| self.end_time - chrono::Duration::minutes(m as i64))
    }

    /// Check if the leaderboard is currently frozen
    pub fn is_leaderboard_frozen(&self) -> bool {
        self.is_leaderboard_frozen_at(Utc::now())
    }

    /// Freeze check at a given instant. Standings unfreeze once the contest
    /// is over.
    pub fn is_leaderboard_frozen_at(&self, now: DateTime<Utc>) -> bool {
        match self.freeze_time() {
            Some(freeze) => now >= freeze && now < self.end_time,
            None => false,
        }
    }

    /// Check if a problem belongs to this contest
    pub fn has_problem(&self, problem_id: &Uuid) -> bool {
        self.problem_ids.contains(problem_id)
    }

    /// Check if a language is allowed (empty list = all allowed)
    pub fn is_language_allowed(&self, language: &str) -> bool {
        self.allowed_languages.is_empty()
            || self.allowed_languages.iter().any(|l| l == language)
    }
}

/// Contest status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    Upcoming,
    Live,
    Ended,
}

impl std::fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Live => write!(f, "live"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Contest participant model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestParticipant {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub score: i64,
    pub penalty_minutes: i64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn contest(start_offset_min: i64, end_offset_min: i64) -> Contest {
        let now = Utc::now();
        Contest {
            id: Uuid::new_v4(),
            title: "Weekly Round".to_string(),
            description: None,
            owner_id: Uuid::new_v4(),
            start_time: now + Duration::minutes(start_offset_min),
            end_time: now + Duration::minutes(end_offset_min),
            registration_start: None,
            registration_end: None,
            problem_ids: vec![Uuid::new_v4()],
            allowed_languages: vec![],
            max_participants: None,
            max_submissions_per_problem: 50,
            points_per_problem: 100,
            penalty_per_wrong_minutes: 20,
            freeze_minutes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(contest(10, 70).status(), ContestStatus::Upcoming);
        assert_eq!(contest(-10, 50).status(), ContestStatus::Live);
        assert_eq!(contest(-70, -10).status(), ContestStatus::Ended);
    }

    #[test]
    fn test_registration_defaults_to_contest_end() {
        // No explicit window: open while the contest has not ended
        assert!(contest(10, 70).is_registration_open());
        assert!(contest(-10, 50).is_registration_open());
        assert!(!contest(-70, -10).is_registration_open());
    }

    #[test]
    fn test_registration_window_bounds() {
        let now = Utc::now();
        let mut c = contest(60, 120);
        c.registration_start = Some(now + Duration::minutes(10));
        assert!(!c.is_registration_open());

        c.registration_start = Some(now - Duration::minutes(10));
        c.registration_end = Some(now - Duration::minutes(5));
        assert!(!c.is_registration_open());

        c.registration_end = Some(now + Duration::minutes(30));
        assert!(c.is_registration_open());
    }

    #[test]
    fn test_freeze_window() {
        let mut c = contest(-50, 10);
        assert!(!c.is_leaderboard_frozen());

        // Freeze covers the last 20 minutes; we are 10 minutes from the end
        c.freeze_minutes = Some(20);
        assert!(c.is_leaderboard_frozen());

        // After the end, standings unfreeze
        let mut ended = contest(-70, -10);
        ended.freeze_minutes = Some(20);
        assert!(!ended.is_leaderboard_frozen());
    }

    #[test]
    fn test_language_allowed() {
        let mut c = contest(0, 60);
        assert!(c.is_language_allowed("rust"));

        c.allowed_languages = vec!["cpp".to_string(), "python".to_string()];
        assert!(c.is_language_allowed("cpp"));
        assert!(!c.is_language_allowed("rust"));
    }
}
