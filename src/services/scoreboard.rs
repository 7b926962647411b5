//! Leaderboard aggregation and ranking
//!
//! Standings are a pure function of the submission log: points for the first
//! accepted run per problem, penalty minutes from contest start to that
//! accept plus a fixed charge per wrong attempt before it. Rank is assigned
//! on read and never stored. The freeze path reuses the same aggregation
//! over the log truncated at the freeze instant.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Contest, ContestSubmission, Verdict};

/// Per-contest scoring knobs
#[derive(Debug, Clone, Copy)]
pub struct ScoringPolicy {
    pub points_per_problem: i64,
    pub penalty_per_wrong_minutes: i64,
}

impl From<&Contest> for ScoringPolicy {
    fn from(contest: &Contest) -> Self {
        Self {
            points_per_problem: contest.points_per_problem as i64,
            penalty_per_wrong_minutes: contest.penalty_per_wrong_minutes as i64,
        }
    }
}

/// Aggregate standing of one participant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Standing {
    pub score: i64,
    pub penalty_minutes: i64,
    /// Time of the last submission that changed the score
    pub last_submission_at: Option<DateTime<Utc>>,
}

/// One row fed into ranking
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantStanding {
    pub user_id: Uuid,
    pub username: String,
    pub team_name: Option<String>,
    pub score: i64,
    pub penalty_minutes: i64,
    pub last_submission_at: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
}

/// One ranked leaderboard row
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankedEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub username: String,
    pub team_name: Option<String>,
    pub score: i64,
    pub penalty_minutes: i64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

/// Fold a submission log into per-user standings.
///
/// The log must be in submission order. Attempts on an already-solved
/// problem and runs without a final verdict (pending, judge malfunction)
/// never affect the standing.
pub fn aggregate_standings(
    contest_start: DateTime<Utc>,
    policy: ScoringPolicy,
    submissions: &[ContestSubmission],
) -> HashMap<Uuid, Standing> {
    // (user, problem) -> wrong attempts so far; solved pairs drop out
    let mut wrong_attempts: HashMap<(Uuid, Uuid), i64> = HashMap::new();
    let mut solved: HashSet<(Uuid, Uuid)> = HashSet::new();
    let mut standings: HashMap<Uuid, Standing> = HashMap::new();

    for submission in submissions {
        let key = (submission.user_id, submission.problem_id);
        if solved.contains(&key) {
            continue;
        }

        let Some(verdict) = submission.verdict() else {
            continue;
        };

        match verdict {
            Verdict::Accepted => {
                solved.insert(key);
                let wrongs = wrong_attempts.remove(&key).unwrap_or(0);
                let solve_minutes =
                    (submission.submitted_at - contest_start).num_minutes().max(0);

                let standing = standings.entry(submission.user_id).or_default();
                standing.score += policy.points_per_problem;
                standing.penalty_minutes +=
                    solve_minutes + wrongs * policy.penalty_per_wrong_minutes;
                standing.last_submission_at = Some(
                    standing
                        .last_submission_at
                        .map_or(submission.submitted_at, |t| t.max(submission.submitted_at)),
                );
            }
            v if v.counts_as_wrong() => {
                *wrong_attempts.entry(key).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    standings
}

/// Sort standings into leaderboard order and assign 1-based ranks.
///
/// Total order: score desc, penalty asc, last scoring submission asc
/// (participants without one sort first), registration time as the final
/// tie-break so the order is stable across reads.
pub fn rank_standings(mut rows: Vec<ParticipantStanding>) -> Vec<RankedEntry> {
    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.penalty_minutes.cmp(&b.penalty_minutes))
            .then(a.last_submission_at.cmp(&b.last_submission_at))
            .then(a.registered_at.cmp(&b.registered_at))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| RankedEntry {
            rank: (i + 1) as i64,
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            score: row.score,
            penalty_minutes: row.penalty_minutes,
            last_submission_at: row.last_submission_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const POLICY: ScoringPolicy = ScoringPolicy {
        points_per_problem: 100,
        penalty_per_wrong_minutes: 20,
    };

    fn submission(
        user: Uuid,
        problem: Uuid,
        verdict: Verdict,
        minutes_in: i64,
        start: DateTime<Utc>,
    ) -> ContestSubmission {
        ContestSubmission {
            id: Uuid::new_v4(),
            contest_id: Uuid::new_v4(),
            problem_id: problem,
            user_id: user,
            language: "rust".to_string(),
            source_code: String::new(),
            verdict: verdict.as_str().to_string(),
            score: 0,
            submitted_at: start + Duration::minutes(minutes_in),
            judged_at: Some(start + Duration::minutes(minutes_in)),
        }
    }

    fn standing_row(
        user_id: Uuid,
        username: &str,
        score: i64,
        penalty: i64,
        last: Option<DateTime<Utc>>,
        registered: DateTime<Utc>,
    ) -> ParticipantStanding {
        ParticipantStanding {
            user_id,
            username: username.to_string(),
            team_name: None,
            score,
            penalty_minutes: penalty,
            last_submission_at: last,
            registered_at: registered,
        }
    }

    #[test]
    fn test_accept_scores_full_points_with_solve_time_penalty() {
        let start = Utc::now();
        let user = Uuid::new_v4();
        let problem = Uuid::new_v4();

        let log = vec![submission(user, problem, Verdict::Accepted, 30, start)];
        let standings = aggregate_standings(start, POLICY, &log);

        let s = &standings[&user];
        assert_eq!(s.score, 100);
        assert_eq!(s.penalty_minutes, 30);
    }

    #[test]
    fn test_wrong_attempts_before_accept_accrue_penalty() {
        let start = Utc::now();
        let user = Uuid::new_v4();
        let problem = Uuid::new_v4();

        let log = vec![
            submission(user, problem, Verdict::WrongAnswer, 10, start),
            submission(user, problem, Verdict::TimeLimitExceeded, 20, start),
            submission(user, problem, Verdict::Accepted, 45, start),
        ];
        let standings = aggregate_standings(start, POLICY, &log);

        let s = &standings[&user];
        assert_eq!(s.score, 100);
        // 45 minutes to solve + 2 wrong attempts * 20
        assert_eq!(s.penalty_minutes, 45 + 40);
    }

    #[test]
    fn test_unsolved_problems_contribute_nothing() {
        let start = Utc::now();
        let user = Uuid::new_v4();
        let solved = Uuid::new_v4();
        let unsolved = Uuid::new_v4();

        let log = vec![
            submission(user, unsolved, Verdict::WrongAnswer, 5, start),
            submission(user, unsolved, Verdict::WrongAnswer, 15, start),
            submission(user, solved, Verdict::Accepted, 25, start),
        ];
        let standings = aggregate_standings(start, POLICY, &log);

        let s = &standings[&user];
        assert_eq!(s.score, 100);
        // Wrong attempts on a never-solved problem carry no penalty
        assert_eq!(s.penalty_minutes, 25);
    }

    #[test]
    fn test_submissions_after_solve_are_ignored() {
        let start = Utc::now();
        let user = Uuid::new_v4();
        let problem = Uuid::new_v4();

        let log = vec![
            submission(user, problem, Verdict::Accepted, 10, start),
            submission(user, problem, Verdict::WrongAnswer, 20, start),
            submission(user, problem, Verdict::Accepted, 30, start),
        ];
        let standings = aggregate_standings(start, POLICY, &log);

        let s = &standings[&user];
        assert_eq!(s.score, 100);
        assert_eq!(s.penalty_minutes, 10);
        assert_eq!(s.last_submission_at, Some(start + Duration::minutes(10)));
    }

    #[test]
    fn test_pending_and_internal_error_do_not_count() {
        let start = Utc::now();
        let user = Uuid::new_v4();
        let problem = Uuid::new_v4();

        let log = vec![
            submission(user, problem, Verdict::Pending, 5, start),
            submission(user, problem, Verdict::InternalError, 10, start),
            submission(user, problem, Verdict::Accepted, 20, start),
        ];
        let standings = aggregate_standings(start, POLICY, &log);

        let s = &standings[&user];
        // No wrong-attempt penalty from the judge hiccups
        assert_eq!(s.penalty_minutes, 20);
    }

    #[test]
    fn test_rank_total_order() {
        let now = Utc::now();
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let rows = vec![
            standing_row(a, "a", 200, 100, Some(now), now),
            standing_row(b, "b", 300, 250, Some(now), now),
            standing_row(c, "c", 200, 80, Some(now), now),
            standing_row(d, "d", 0, 0, None, now),
        ];

        let ranked = rank_standings(rows);
        let order: Vec<&str> = ranked.iter().map(|e| e.username.as_str()).collect();
        // Highest score first, penalty breaks the 200 tie
        assert_eq!(order, vec!["b", "c", "a", "d"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[3].rank, 4);
    }

    #[test]
    fn test_equal_score_and_penalty_breaks_on_earlier_last_submission() {
        let now = Utc::now();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let rows = vec![
            standing_row(a, "late", 100, 50, Some(now + Duration::minutes(10)), now),
            standing_row(b, "early", 100, 50, Some(now + Duration::minutes(5)), now),
        ];

        let ranked = rank_standings(rows);
        assert_eq!(ranked[0].username, "early");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].username, "late");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_freeze_is_aggregation_over_truncated_log() {
        let start = Utc::now();
        let user = Uuid::new_v4();
        let problem_a = Uuid::new_v4();
        let problem_b = Uuid::new_v4();

        let log = vec![
            submission(user, problem_a, Verdict::Accepted, 30, start),
            submission(user, problem_b, Verdict::Accepted, 110, start),
        ];

        // Freeze at minute 100: only the first solve is visible
        let freeze = start + Duration::minutes(100);
        let frozen_log: Vec<_> = log
            .iter()
            .filter(|s| s.submitted_at < freeze)
            .cloned()
            .collect();

        let frozen = aggregate_standings(start, POLICY, &frozen_log);
        let live = aggregate_standings(start, POLICY, &log);

        assert_eq!(frozen[&user].score, 100);
        assert_eq!(live[&user].score, 200);
    }
}
