//! Contest request DTOs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::constants::{
    MAX_CONTEST_DESCRIPTION_LENGTH, MAX_CONTEST_TITLE_LENGTH, MAX_SOURCE_CODE_LENGTH,
};

/// Create contest request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContestRequest {
    #[validate(length(min = 1, max = MAX_CONTEST_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(max = MAX_CONTEST_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    /// Contest start time
    pub start_time: DateTime<Utc>,

    /// Contest end time
    pub end_time: DateTime<Utc>,

    /// Registration opens at (optional; defaults to always-open until end)
    pub registration_start: Option<DateTime<Utc>>,

    /// Registration closes at (optional)
    pub registration_end: Option<DateTime<Utc>>,

    /// Problems included in the contest
    pub problem_ids: Vec<Uuid>,

    /// Allowed programming languages (empty = all)
    pub allowed_languages: Option<Vec<String>>,

    /// Participant cap (optional = unlimited)
    pub max_participants: Option<i32>,

    /// Attempt cap per participant per problem
    pub max_submissions_per_problem: Option<i32>,

    /// Points for a solved problem
    pub points_per_problem: Option<i32>,

    /// Penalty minutes per wrong attempt before the first accept
    pub penalty_per_wrong_minutes: Option<i32>,

    /// Freeze leaderboard N minutes before the end (optional)
    pub freeze_minutes: Option<i32>,
}

/// Update contest request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContestRequest {
    #[validate(length(min = 1, max = MAX_CONTEST_TITLE_LENGTH))]
    pub title: Option<String>,

    #[validate(length(max = MAX_CONTEST_DESCRIPTION_LENGTH))]
    pub description: Option<String>,

    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub problem_ids: Option<Vec<Uuid>>,
    pub allowed_languages: Option<Vec<String>>,
    pub max_participants: Option<i32>,
    pub max_submissions_per_problem: Option<i32>,
    pub points_per_problem: Option<i32>,
    pub penalty_per_wrong_minutes: Option<i32>,
    pub freeze_minutes: Option<i32>,
}

/// List contests query parameters
#[derive(Debug, Deserialize)]
pub struct ListContestsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// upcoming, live, ended
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Contest registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 100))]
    pub team_name: Option<String>,
}

/// Solution submission request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitSolutionRequest {
    pub problem_id: Uuid,

    #[validate(length(min = 1))]
    pub language: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_LENGTH))]
    pub source_code: String,
}

/// Leaderboard query parameters
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Truncate to the top N entries
    pub limit: Option<i64>,
}
