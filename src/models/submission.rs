//! Contest submission model
//!
//! Submissions are an append-only log; participant standings are always an
//! aggregate over this log, never the other way around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Verdict assigned after judging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pending,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    RuntimeError,
    CompileError,
    InternalError,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::WrongAnswer => "wrong_answer",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::RuntimeError => "runtime_error",
            Self::CompileError => "compile_error",
            Self::InternalError => "internal_error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "wrong_answer" => Some(Self::WrongAnswer),
            "time_limit_exceeded" => Some(Self::TimeLimitExceeded),
            "memory_limit_exceeded" => Some(Self::MemoryLimitExceeded),
            "runtime_error" => Some(Self::RuntimeError),
            "compile_error" => Some(Self::CompileError),
            "internal_error" => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Wrong attempts accrue penalty; judge malfunctions and pending runs
    /// do not count against the participant.
    pub fn counts_as_wrong(&self) -> bool {
        matches!(
            self,
            Self::WrongAnswer
                | Self::TimeLimitExceeded
                | Self::MemoryLimitExceeded
                | Self::RuntimeError
                | Self::CompileError
        )
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contest submission database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestSubmission {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub problem_id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    #[serde(skip_serializing)]
    pub source_code: String,
    pub verdict: String,
    pub score: i64,
    pub submitted_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

impl ContestSubmission {
    pub fn verdict(&self) -> Option<Verdict> {
        Verdict::parse(&self.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_roundtrip() {
        for v in [
            Verdict::Pending,
            Verdict::Accepted,
            Verdict::WrongAnswer,
            Verdict::TimeLimitExceeded,
            Verdict::MemoryLimitExceeded,
            Verdict::RuntimeError,
            Verdict::CompileError,
            Verdict::InternalError,
        ] {
            assert_eq!(Verdict::parse(v.as_str()), Some(v));
        }
        assert_eq!(Verdict::parse("unknown"), None);
    }

    #[test]
    fn test_penalty_accrual_classification() {
        assert!(Verdict::WrongAnswer.counts_as_wrong());
        assert!(Verdict::TimeLimitExceeded.counts_as_wrong());
        assert!(!Verdict::Accepted.counts_as_wrong());
        assert!(!Verdict::Pending.counts_as_wrong());
        assert!(!Verdict::InternalError.counts_as_wrong());
    }
}
