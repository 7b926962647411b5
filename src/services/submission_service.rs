//! Submission service
//!
//! Recording a submission and judging it are separate steps: the row exists
//! as `pending` before the execution service is called, and the judged
//! verdict plus the participant's recomputed standing land in a single
//! transaction afterwards.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    clients::{ExecutionClient, execution::ExecutionResult, execution::ExecutionStatus},
    db::repositories::{ContestRepository, SubmissionRepository},
    error::{AppError, AppResult},
    models::{Contest, ContestStatus, ContestSubmission, Verdict},
    services::scoreboard::{self, ScoringPolicy},
    utils::validation::validate_language,
};

/// Default judging limits handed to the execution service
const JUDGE_TIME_LIMIT_SECS: u64 = 5;
const JUDGE_MEMORY_LIMIT_MB: u64 = 128;

/// Submission service
pub struct SubmissionService {
    db: PgPool,
    executor: ExecutionClient,
}

impl SubmissionService {
    pub fn new(db: PgPool, executor: ExecutionClient) -> Self {
        Self { db, executor }
    }

    /// Accept, judge, and score a contest submission
    pub async fn submit(
        &self,
        contest_id: &Uuid,
        user_id: &Uuid,
        problem_id: &Uuid,
        language: &str,
        source_code: &str,
    ) -> AppResult<ContestSubmission> {
        let contest = ContestRepository::find_by_id(&self.db, contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        self.check_submittable(&contest, user_id, problem_id, language)
            .await?;

        let submission = SubmissionRepository::create(
            &self.db,
            contest_id,
            problem_id,
            user_id,
            language,
            source_code,
        )
        .await?;

        // Judging happens out of process; a collaborator failure leaves the
        // row as internal_error instead of poisoning the standings
        let result = match self
            .executor
            .judge(
                problem_id,
                user_id,
                source_code,
                language,
                JUDGE_TIME_LIMIT_SECS,
                JUDGE_MEMORY_LIMIT_MB,
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                if let Err(mark_err) =
                    SubmissionRepository::record_internal_error(&self.db, &submission.id).await
                {
                    tracing::error!(submission_id = %submission.id,
                        "Failed to mark submission as errored: {}", mark_err);
                }
                return Err(e);
            }
        };

        let verdict = verdict_from_execution(&result);
        let score = if verdict == Verdict::Accepted {
            contest.points_per_problem as i64
        } else {
            0
        };

        self.record_judged_result(&contest, &submission.id, user_id, verdict, score)
            .await
    }

    /// Fetch one submission; participants only see their own
    pub async fn get_submission(
        &self,
        id: &Uuid,
        requester_id: &Uuid,
        requester_is_admin: bool,
    ) -> AppResult<ContestSubmission> {
        let submission = SubmissionRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if submission.user_id != *requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Cannot view other users' submissions".to_string(),
            ));
        }

        Ok(submission)
    }

    /// A participant's own submissions for one contest
    pub async fn list_own_submissions(
        &self,
        contest_id: &Uuid,
        user_id: &Uuid,
    ) -> AppResult<Vec<ContestSubmission>> {
        SubmissionRepository::list_for_participant(&self.db, contest_id, user_id).await
    }

    async fn check_submittable(
        &self,
        contest: &Contest,
        user_id: &Uuid,
        problem_id: &Uuid,
        language: &str,
    ) -> AppResult<()> {
        if contest.status() != ContestStatus::Live {
            return Err(AppError::Conflict("Contest is not active".to_string()));
        }

        if !ContestRepository::is_participant(&self.db, &contest.id, user_id).await? {
            return Err(AppError::Forbidden(
                "Not registered for this contest".to_string(),
            ));
        }

        if !contest.has_problem(problem_id) {
            return Err(AppError::NotFound(
                "Problem is not part of this contest".to_string(),
            ));
        }

        validate_language(language).map_err(|e| AppError::Validation(e.to_string()))?;
        if !contest.is_language_allowed(language) {
            return Err(AppError::Validation(format!(
                "Language {} is not allowed in this contest",
                language
            )));
        }

        let attempts = SubmissionRepository::count_for_problem(
            &self.db,
            &contest.id,
            user_id,
            problem_id,
        )
        .await?;
        if attempts >= contest.max_submissions_per_problem as i64 {
            return Err(AppError::Conflict(
                "Submission limit reached for this problem".to_string(),
            ));
        }

        Ok(())
    }

    /// Store the verdict and refresh the participant's aggregate standing
    /// in one transaction, so the leaderboard never sees a half-applied
    /// result.
    async fn record_judged_result(
        &self,
        contest: &Contest,
        submission_id: &Uuid,
        user_id: &Uuid,
        verdict: Verdict,
        score: i64,
    ) -> AppResult<ContestSubmission> {
        let mut tx = self.db.begin().await?;

        let submission =
            SubmissionRepository::record_verdict(&mut tx, submission_id, verdict, score).await?;

        let log =
            SubmissionRepository::list_for_participant_in_tx(&mut tx, &contest.id, user_id)
                .await?;
        let standings = scoreboard::aggregate_standings(
            contest.start_time,
            ScoringPolicy::from(contest),
            &log,
        );
        let standing = standings.get(user_id).cloned().unwrap_or_default();

        ContestRepository::update_participant_standing(
            &mut tx,
            &contest.id,
            user_id,
            standing.score,
            standing.penalty_minutes,
            standing.last_submission_at,
        )
        .await?;

        tx.commit().await?;

        Ok(submission)
    }
}

/// Map an execution service result onto a verdict
fn verdict_from_execution(result: &ExecutionResult) -> Verdict {
    match result.status {
        ExecutionStatus::Success => {
            if result.total_tests > 0 && result.passed_tests == result.total_tests {
                Verdict::Accepted
            } else {
                Verdict::WrongAnswer
            }
        }
        ExecutionStatus::RuntimeError | ExecutionStatus::SecurityViolation => {
            Verdict::RuntimeError
        }
        ExecutionStatus::CompileError => Verdict::CompileError,
        ExecutionStatus::TimeLimitExceeded => Verdict::TimeLimitExceeded,
        ExecutionStatus::MemoryLimitExceeded => Verdict::MemoryLimitExceeded,
        ExecutionStatus::InternalError => Verdict::InternalError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: ExecutionStatus, passed: i64, total: i64) -> ExecutionResult {
        ExecutionResult {
            status,
            output: String::new(),
            error: None,
            execution_time: 0.1,
            memory_used: 1024,
            test_results: vec![],
            total_tests: total,
            passed_tests: passed,
        }
    }

    #[test]
    fn test_all_tests_passing_is_accepted() {
        let verdict = verdict_from_execution(&result(ExecutionStatus::Success, 10, 10));
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[test]
    fn test_partial_pass_is_wrong_answer() {
        let verdict = verdict_from_execution(&result(ExecutionStatus::Success, 7, 10));
        assert_eq!(verdict, Verdict::WrongAnswer);

        // A run with no tests at all cannot be accepted
        let verdict = verdict_from_execution(&result(ExecutionStatus::Success, 0, 0));
        assert_eq!(verdict, Verdict::WrongAnswer);
    }

    #[test]
    fn test_failure_statuses_map_onto_verdicts() {
        assert_eq!(
            verdict_from_execution(&result(ExecutionStatus::TimeLimitExceeded, 0, 10)),
            Verdict::TimeLimitExceeded
        );
        assert_eq!(
            verdict_from_execution(&result(ExecutionStatus::CompileError, 0, 0)),
            Verdict::CompileError
        );
        assert_eq!(
            verdict_from_execution(&result(ExecutionStatus::SecurityViolation, 0, 0)),
            Verdict::RuntimeError
        );
        assert_eq!(
            verdict_from_execution(&result(ExecutionStatus::InternalError, 0, 0)),
            Verdict::InternalError
        );
    }
}
