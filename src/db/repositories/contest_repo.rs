//! Contest repository

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Contest, ContestParticipant},
};

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Create a new contest
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        title: &str,
        description: Option<&str>,
        owner_id: &Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        registration_start: Option<DateTime<Utc>>,
        registration_end: Option<DateTime<Utc>>,
        problem_ids: &[Uuid],
        allowed_languages: &[String],
        max_participants: Option<i32>,
        max_submissions_per_problem: i32,
        points_per_problem: i32,
        penalty_per_wrong_minutes: i32,
        freeze_minutes: Option<i32>,
    ) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            INSERT INTO contests (
                title, description, owner_id, start_time, end_time,
                registration_start, registration_end, problem_ids, allowed_languages,
                max_participants, max_submissions_per_problem, points_per_problem,
                penalty_per_wrong_minutes, freeze_minutes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(owner_id)
        .bind(start_time)
        .bind(end_time)
        .bind(registration_start)
        .bind(registration_end)
        .bind(problem_ids)
        .bind(allowed_languages)
        .bind(max_participants)
        .bind(max_submissions_per_problem)
        .bind(points_per_problem)
        .bind(penalty_per_wrong_minutes)
        .bind(freeze_minutes)
        .fetch_one(pool)
        .await?;

        Ok(contest)
    }

    /// Find contest by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// Find contest by ID, locking the row for the transaction.
    /// Registration uses this to make the capacity check serialize.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: &Uuid,
    ) -> AppResult<Option<Contest>> {
        let contest =
            sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1 FOR UPDATE"#)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(contest)
    }

    /// Update contest
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &PgPool,
        id: &Uuid,
        title: Option<&str>,
        description: Option<&str>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        registration_start: Option<DateTime<Utc>>,
        registration_end: Option<DateTime<Utc>>,
        problem_ids: Option<&[Uuid]>,
        allowed_languages: Option<&[String]>,
        max_participants: Option<i32>,
        max_submissions_per_problem: Option<i32>,
        points_per_problem: Option<i32>,
        penalty_per_wrong_minutes: Option<i32>,
        freeze_minutes: Option<i32>,
    ) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            UPDATE contests
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                registration_start = COALESCE($6, registration_start),
                registration_end = COALESCE($7, registration_end),
                problem_ids = COALESCE($8, problem_ids),
                allowed_languages = COALESCE($9, allowed_languages),
                max_participants = COALESCE($10, max_participants),
                max_submissions_per_problem = COALESCE($11, max_submissions_per_problem),
                points_per_problem = COALESCE($12, points_per_problem),
                penalty_per_wrong_minutes = COALESCE($13, penalty_per_wrong_minutes),
                freeze_minutes = COALESCE($14, freeze_minutes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(start_time)
        .bind(end_time)
        .bind(registration_start)
        .bind(registration_end)
        .bind(problem_ids)
        .bind(allowed_languages)
        .bind(max_participants)
        .bind(max_submissions_per_problem)
        .bind(points_per_problem)
        .bind(penalty_per_wrong_minutes)
        .bind(freeze_minutes)
        .fetch_one(pool)
        .await?;

        Ok(contest)
    }

    /// Delete contest
    pub async fn delete(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"DELETE FROM contests WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// List contests with pagination, optionally filtered by derived status
    pub async fn list(
        pool: &PgPool,
        offset: i64,
        limit: i64,
        status: Option<&str>,
        search: Option<&str>,
    ) -> AppResult<(Vec<Contest>, i64)> {
        let search_pattern = search.map(|s| format!("%{}%", s));
        let now = Utc::now();

        let contests = sqlx::query_as::<_, Contest>(
            r#"
            SELECT * FROM contests
            WHERE
                ($1::text IS NULL OR title ILIKE $1)
                AND (
                    $2::text IS NULL
                    OR ($2 = 'upcoming' AND start_time > $3)
                    OR ($2 = 'live' AND start_time <= $3 AND end_time > $3)
                    OR ($2 = 'ended' AND end_time <= $3)
                )
            ORDER BY start_time DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&search_pattern)
        .bind(status)
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM contests
            WHERE
                ($1::text IS NULL OR title ILIKE $1)
                AND (
                    $2::text IS NULL
                    OR ($2 = 'upcoming' AND start_time > $3)
                    OR ($2 = 'live' AND start_time <= $3 AND end_time > $3)
                    OR ($2 = 'ended' AND end_time <= $3)
                )
            "#,
        )
        .bind(&search_pattern)
        .bind(status)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok((contests, total))
    }

    /// Insert a participant row inside the registration transaction
    pub async fn register_participant(
        conn: &mut PgConnection,
        contest_id: &Uuid,
        user_id: &Uuid,
        team_name: Option<&str>,
    ) -> AppResult<ContestParticipant> {
        let participant = sqlx::query_as::<_, ContestParticipant>(
            r#"
            INSERT INTO contest_participants (contest_id, user_id, team_name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(team_name)
        .fetch_one(&mut *conn)
        .await?;

        Ok(participant)
    }

    /// Remove a participant
    pub async fn unregister_participant(
        pool: &PgPool,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"DELETE FROM contest_participants WHERE contest_id = $1 AND user_id = $2"#,
        )
        .bind(contest_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Check whether a user is registered
    pub async fn is_participant(
        pool: &PgPool,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contest_participants
                WHERE contest_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Same check inside the registration transaction
    pub async fn is_participant_in_tx(
        conn: &mut PgConnection,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contest_participants
                WHERE contest_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Count registered participants inside the registration transaction
    pub async fn participant_count_in_tx(
        conn: &mut PgConnection,
        contest_id: &Uuid,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM contest_participants WHERE contest_id = $1"#,
        )
        .bind(contest_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }

    /// Overwrite a participant's aggregate standing inside the judging transaction
    pub async fn update_participant_standing(
        conn: &mut PgConnection,
        contest_id: &Uuid,
        user_id: &Uuid,
        score: i64,
        penalty_minutes: i64,
        last_submission_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE contest_participants
            SET score = $3, penalty_minutes = $4, last_submission_at = $5
            WHERE contest_id = $1 AND user_id = $2
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(score)
        .bind(penalty_minutes)
        .bind(last_submission_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
