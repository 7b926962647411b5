//! Contest service

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    constants::DEFAULT_LEADERBOARD_LIMIT,
    db::repositories::{ContestRepository, SubmissionRepository},
    error::{AppError, AppResult},
    handlers::contests::request::{CreateContestRequest, UpdateContestRequest},
    models::{
        Contest, ContestParticipant, ContestStatus, NotificationChannel, NotificationKind,
    },
    services::{
        NotificationService,
        scoreboard::{self, ParticipantStanding, RankedEntry, ScoringPolicy},
    },
    utils::validation::validate_language,
};

/// Leaderboard view returned to handlers
#[derive(Debug)]
pub struct LeaderboardView {
    pub contest_id: Uuid,
    pub is_frozen: bool,
    pub frozen_at: Option<DateTime<Utc>>,
    pub entries: Vec<RankedEntry>,
    pub total: i64,
}

/// Contest service
pub struct ContestService {
    db: PgPool,
    notifications: NotificationService,
}

impl ContestService {
    pub fn new(db: PgPool, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Create a new contest
    pub async fn create_contest(
        &self,
        owner_id: &Uuid,
        payload: CreateContestRequest,
    ) -> AppResult<Contest> {
        validate_contest_window(
            payload.start_time,
            payload.end_time,
            payload.registration_start,
            payload.registration_end,
            payload.freeze_minutes,
        )?;

        if payload.problem_ids.is_empty() {
            return Err(AppError::Validation(
                "Contest must include at least one problem".to_string(),
            ));
        }

        if let Some(languages) = &payload.allowed_languages {
            for language in languages {
                validate_language(language)
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
        }

        if let Some(cap) = payload.max_participants {
            if cap < 1 {
                return Err(AppError::Validation(
                    "Participant cap must be at least 1".to_string(),
                ));
            }
        }

        ContestRepository::create(
            &self.db,
            &payload.title,
            payload.description.as_deref(),
            owner_id,
            payload.start_time,
            payload.end_time,
            payload.registration_start,
            payload.registration_end,
            &payload.problem_ids,
            &payload.allowed_languages.unwrap_or_default(),
            payload.max_participants,
            payload
                .max_submissions_per_problem
                .unwrap_or(crate::constants::DEFAULT_MAX_SUBMISSIONS_PER_PROBLEM),
            payload
                .points_per_problem
                .unwrap_or(crate::constants::DEFAULT_POINTS_PER_PROBLEM),
            payload
                .penalty_per_wrong_minutes
                .unwrap_or(crate::constants::DEFAULT_PENALTY_PER_WRONG_MINUTES),
            payload.freeze_minutes,
        )
        .await
    }

    /// Get contest by ID
    pub async fn get_contest(&self, id: &Uuid) -> AppResult<Contest> {
        ContestRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    /// Update contest (owner or admin only)
    pub async fn update_contest(
        &self,
        id: &Uuid,
        requester_id: &Uuid,
        requester_is_admin: bool,
        payload: UpdateContestRequest,
    ) -> AppResult<Contest> {
        let contest = self.get_contest(id).await?;

        if contest.owner_id != *requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Cannot update other users' contests".to_string(),
            ));
        }

        let start = payload.start_time.unwrap_or(contest.start_time);
        let end = payload.end_time.unwrap_or(contest.end_time);
        validate_contest_window(
            start,
            end,
            payload.registration_start.or(contest.registration_start),
            payload.registration_end.or(contest.registration_end),
            payload.freeze_minutes.or(contest.freeze_minutes),
        )?;

        if let Some(problem_ids) = &payload.problem_ids {
            if problem_ids.is_empty() {
                return Err(AppError::Validation(
                    "Contest must include at least one problem".to_string(),
                ));
            }
        }

        ContestRepository::update(
            &self.db,
            id,
            payload.title.as_deref(),
            payload.description.as_deref(),
            payload.start_time,
            payload.end_time,
            payload.registration_start,
            payload.registration_end,
            payload.problem_ids.as_deref(),
            payload.allowed_languages.as_deref(),
            payload.max_participants,
            payload.max_submissions_per_problem,
            payload.points_per_problem,
            payload.penalty_per_wrong_minutes,
            payload.freeze_minutes,
        )
        .await
    }

    /// Delete contest (owner or admin only)
    pub async fn delete_contest(
        &self,
        id: &Uuid,
        requester_id: &Uuid,
        requester_is_admin: bool,
    ) -> AppResult<()> {
        let contest = self.get_contest(id).await?;

        if contest.owner_id != *requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Cannot delete other users' contests".to_string(),
            ));
        }

        ContestRepository::delete(&self.db, id).await
    }

    /// List contests with pagination
    pub async fn list_contests(
        &self,
        page: u32,
        per_page: u32,
        status: Option<&str>,
        search: Option<&str>,
    ) -> AppResult<(Vec<Contest>, i64)> {
        let offset = ((page - 1) * per_page) as i64;
        let limit = per_page as i64;

        ContestRepository::list(&self.db, offset, limit, status, search).await
    }

    /// Register a participant.
    ///
    /// The contest row is locked for the capacity check, so two concurrent
    /// registrations for the last slot cannot both get in; the loser fails
    /// with `Conflict` like any other full-contest attempt.
    pub async fn register_participant(
        &self,
        contest_id: &Uuid,
        user_id: &Uuid,
        team_name: Option<&str>,
    ) -> AppResult<ContestParticipant> {
        let mut tx = self.db.begin().await?;

        let contest = ContestRepository::find_by_id_for_update(&mut tx, contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        if !contest.is_registration_open() {
            return Err(AppError::Conflict(
                "Registration is closed for this contest".to_string(),
            ));
        }

        if ContestRepository::is_participant_in_tx(&mut tx, contest_id, user_id).await? {
            return Err(AppError::Conflict(
                "Already registered for this contest".to_string(),
            ));
        }

        if let Some(cap) = contest.max_participants {
            let count = ContestRepository::participant_count_in_tx(&mut tx, contest_id).await?;
            if count >= cap as i64 {
                return Err(AppError::Conflict("Contest is full".to_string()));
            }
        }

        let participant =
            ContestRepository::register_participant(&mut tx, contest_id, user_id, team_name)
                .await
                .map_err(|e| match e {
                    // Unique-constraint backstop for a racing duplicate
                    AppError::AlreadyExists(_) => AppError::Conflict(
                        "Already registered for this contest".to_string(),
                    ),
                    other => other,
                })?;

        tx.commit().await?;

        // Confirmation is best-effort; registration stands either way
        let confirmation = crate::services::notification_service::CreateNotification {
            user_id: Some(*user_id),
            user_ids: None,
            kind: NotificationKind::RegistrationConfirmed,
            channel: NotificationChannel::Both,
            payload: json!({
                "contest_id": contest.id,
                "message": format!("You are registered for \"{}\".", contest.title),
            }),
            expires_at: Some(contest.end_time),
        };
        if let Err(e) = self.notifications.create(&confirmation).await {
            tracing::warn!(contest_id = %contest.id, user_id = %user_id,
                "Failed to send registration notification: {}", e);
        }

        Ok(participant)
    }

    /// Unregister before the contest starts
    pub async fn unregister_participant(
        &self,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<()> {
        let contest = self.get_contest(contest_id).await?;

        if contest.status() != ContestStatus::Upcoming {
            return Err(AppError::Conflict(
                "Cannot unregister after the contest starts".to_string(),
            ));
        }

        ContestRepository::unregister_participant(&self.db, contest_id, user_id).await
    }

    /// List participants with usernames
    pub async fn list_participants(
        &self,
        contest_id: &Uuid,
    ) -> AppResult<Vec<ParticipantStanding>> {
        // Existence check first so an unknown contest is a 404, not an empty list
        self.get_contest(contest_id).await?;
        self.participant_standings(contest_id).await
    }

    /// Compute the leaderboard.
    ///
    /// Live contests rank the stored participant aggregates. Inside the
    /// freeze window the same aggregation runs over only the submissions
    /// made before the freeze instant, reproducing the last public snapshot
    /// without storing ranks anywhere.
    pub async fn get_leaderboard(
        &self,
        contest_id: &Uuid,
        limit: Option<i64>,
    ) -> AppResult<LeaderboardView> {
        let contest = self.get_contest(contest_id).await?;
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).max(1) as usize;

        let mut rows = self.participant_standings(contest_id).await?;
        let is_frozen = contest.is_leaderboard_frozen();

        if is_frozen {
            let freeze_time = contest
                .freeze_time()
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("frozen without freeze time")))?;

            let submissions = SubmissionRepository::list_for_contest(&self.db, contest_id).await?;
            let visible: Vec<_> = submissions
                .into_iter()
                .filter(|s| s.submitted_at < freeze_time)
                .collect();

            let standings = scoreboard::aggregate_standings(
                contest.start_time,
                ScoringPolicy::from(&contest),
                &visible,
            );

            for row in &mut rows {
                let standing = standings.get(&row.user_id).cloned().unwrap_or_default();
                row.score = standing.score;
                row.penalty_minutes = standing.penalty_minutes;
                row.last_submission_at = standing.last_submission_at;
            }
        }

        let total = rows.len() as i64;
        let mut entries = scoreboard::rank_standings(rows);
        entries.truncate(limit);

        Ok(LeaderboardView {
            contest_id: *contest_id,
            is_frozen,
            frozen_at: is_frozen.then(|| contest.freeze_time()).flatten(),
            entries,
            total,
        })
    }

    async fn participant_standings(
        &self,
        contest_id: &Uuid,
    ) -> AppResult<Vec<ParticipantStanding>> {
        let rows = sqlx::query_as::<_, ParticipantStanding>(
            r#"
            SELECT
                cp.user_id,
                u.username,
                cp.team_name,
                cp.score,
                cp.penalty_minutes,
                cp.last_submission_at,
                cp.registered_at
            FROM contest_participants cp
            JOIN users u ON cp.user_id = u.id
            WHERE cp.contest_id = $1
            ORDER BY cp.registered_at
            "#,
        )
        .bind(contest_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

fn validate_contest_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    registration_start: Option<DateTime<Utc>>,
    registration_end: Option<DateTime<Utc>>,
    freeze_minutes: Option<i32>,
) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "Contest start must be before its end".to_string(),
        ));
    }

    if let (Some(rs), Some(re)) = (registration_start, registration_end) {
        if rs >= re {
            return Err(AppError::Validation(
                "Registration window must open before it closes".to_string(),
            ));
        }
    }

    if let Some(re) = registration_end {
        if re > end {
            return Err(AppError::Validation(
                "Registration cannot close after the contest ends".to_string(),
            ));
        }
    }

    if let Some(freeze) = freeze_minutes {
        let duration_minutes = (end - start).num_minutes();
        if freeze < 0 || freeze as i64 > duration_minutes {
            return Err(AppError::Validation(
                "Freeze window must fit inside the contest".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_validation() {
        let now = Utc::now();

        assert!(validate_contest_window(now + Duration::hours(1), now, None, None, None).is_err());
        assert!(
            validate_contest_window(now, now + Duration::hours(2), None, None, None).is_ok()
        );

        // Registration closing after the end is rejected
        assert!(
            validate_contest_window(
                now,
                now + Duration::hours(2),
                None,
                Some(now + Duration::hours(3)),
                None,
            )
            .is_err()
        );

        // Freeze longer than the contest is rejected
        assert!(
            validate_contest_window(now, now + Duration::hours(1), None, None, Some(90)).is_err()
        );
        assert!(
            validate_contest_window(now, now + Duration::hours(1), None, None, Some(20)).is_ok()
        );
    }
}
