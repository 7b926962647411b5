//! Contest response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{Contest, ContestParticipant, ContestSubmission},
    services::{contest_service::LeaderboardView, scoreboard::RankedEntry},
};

/// Full contest detail
#[derive(Debug, Serialize)]
pub struct ContestResponse {
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
    pub status: String,
    pub registration_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contest> for ContestResponse {
    fn from(contest: Contest) -> Self {
        let status = contest.status().to_string();
        let registration_open = contest.is_registration_open();

        Self {
            id: contest.id,
            title: contest.title,
            description: contest.description,
            owner_id: contest.owner_id,
            start_time: contest.start_time,
            end_time: contest.end_time,
            registration_start: contest.registration_start,
            registration_end: contest.registration_end,
            problem_ids: contest.problem_ids,
            allowed_languages: contest.allowed_languages,
            max_participants: contest.max_participants,
            max_submissions_per_problem: contest.max_submissions_per_problem,
            points_per_problem: contest.points_per_problem,
            penalty_per_wrong_minutes: contest.penalty_per_wrong_minutes,
            freeze_minutes: contest.freeze_minutes,
            status,
            registration_open,
            created_at: contest.created_at,
            updated_at: contest.updated_at,
        }
    }
}

/// Registration confirmation
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub contest_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<ContestParticipant> for RegistrationResponse {
    fn from(participant: ContestParticipant) -> Self {
        Self {
            contest_id: participant.contest_id,
            user_id: participant.user_id,
            team_name: participant.team_name,
            registered_at: participant.registered_at,
        }
    }
}

/// Leaderboard payload
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub contest_id: Uuid,
    pub is_frozen: bool,
    pub frozen_at: Option<DateTime<Utc>>,
    pub entries: Vec<RankedEntry>,
    pub total: i64,
}

impl From<LeaderboardView> for LeaderboardResponse {
    fn from(view: LeaderboardView) -> Self {
        Self {
            contest_id: view.contest_id,
            is_frozen: view.is_frozen,
            frozen_at: view.frozen_at,
            entries: view.entries,
            total: view.total,
        }
    }
}

/// One submission in listings and detail views (source code omitted)
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub problem_id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    pub verdict: String,
    pub score: i64,
    pub submitted_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

impl From<ContestSubmission> for SubmissionResponse {
    fn from(submission: ContestSubmission) -> Self {
        Self {
            id: submission.id,
            contest_id: submission.contest_id,
            problem_id: submission.problem_id,
            user_id: submission.user_id,
            language: submission.language,
            verdict: submission.verdict,
            score: submission.score,
            submitted_at: submission.submitted_at,
            judged_at: submission.judged_at,
        }
    }
}
