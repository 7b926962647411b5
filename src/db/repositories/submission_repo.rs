//! Contest submission repository

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ContestSubmission, Verdict},
};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Record a new pending submission
    pub async fn create(
        pool: &PgPool,
        contest_id: &Uuid,
        problem_id: &Uuid,
        user_id: &Uuid,
        language: &str,
        source_code: &str,
    ) -> AppResult<ContestSubmission> {
        let submission = sqlx::query_as::<_, ContestSubmission>(
            r#"
            INSERT INTO contest_submissions (contest_id, problem_id, user_id, language, source_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(contest_id)
        .bind(problem_id)
        .bind(user_id)
        .bind(language)
        .bind(source_code)
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<ContestSubmission>> {
        let submission = sqlx::query_as::<_, ContestSubmission>(
            r#"SELECT * FROM contest_submissions WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Store the judged verdict and score
    pub async fn record_verdict(
        conn: &mut PgConnection,
        id: &Uuid,
        verdict: Verdict,
        score: i64,
    ) -> AppResult<ContestSubmission> {
        let submission = sqlx::query_as::<_, ContestSubmission>(
            r#"
            UPDATE contest_submissions
            SET verdict = $2, score = $3, judged_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(verdict.as_str())
        .bind(score)
        .fetch_one(&mut *conn)
        .await?;

        Ok(submission)
    }

    /// Mark a submission as failed by judge malfunction (outside any transaction)
    pub async fn record_internal_error(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE contest_submissions
            SET verdict = $2, judged_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Verdict::InternalError.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Count attempts on one problem by one participant
    pub async fn count_for_problem(
        pool: &PgPool,
        contest_id: &Uuid,
        user_id: &Uuid,
        problem_id: &Uuid,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM contest_submissions
            WHERE contest_id = $1 AND user_id = $2 AND problem_id = $3
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .bind(problem_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// A participant's full submission log for one contest, oldest first
    pub async fn list_for_participant(
        pool: &PgPool,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<Vec<ContestSubmission>> {
        let submissions = sqlx::query_as::<_, ContestSubmission>(
            r#"
            SELECT * FROM contest_submissions
            WHERE contest_id = $1 AND user_id = $2
            ORDER BY submitted_at
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }

    /// Same, inside the judging transaction
    pub async fn list_for_participant_in_tx(
        conn: &mut PgConnection,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<Vec<ContestSubmission>> {
        let submissions = sqlx::query_as::<_, ContestSubmission>(
            r#"
            SELECT * FROM contest_submissions
            WHERE contest_id = $1 AND user_id = $2
            ORDER BY submitted_at
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(submissions)
    }

    /// Every submission in a contest, oldest first (leaderboard freeze path)
    pub async fn list_for_contest(
        pool: &PgPool,
        contest_id: &Uuid,
    ) -> AppResult<Vec<ContestSubmission>> {
        let submissions = sqlx::query_as::<_, ContestSubmission>(
            r#"
            SELECT * FROM contest_submissions
            WHERE contest_id = $1
            ORDER BY submitted_at
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }
}
