//! Code execution service client
//!
//! The execution service compiles and runs submissions in isolation and
//! reports per-test results. Test cases are resolved on the service side
//! from the problem id; this client never sees them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::CollaboratorConfig,
    error::{AppError, AppResult},
};

/// Execution request wire format
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: String,
    pub test_cases: Vec<TestCase>,
    pub time_limit: u64,
    pub memory_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Inline test case (used by ad-hoc runs; contest judging sends problem_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// Per-test outcome
#[derive(Debug, Clone, Deserialize)]
pub struct TestResult {
    pub passed: bool,
    pub actual_output: String,
    pub expected_output: String,
    pub execution_time: f64,
    pub memory_used: i64,
    pub error_message: Option<String>,
}

/// Overall execution status reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    RuntimeError,
    CompileError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    SecurityViolation,
    InternalError,
}

/// Execution result wire format
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub output: String,
    pub error: Option<String>,
    pub execution_time: f64,
    pub memory_used: i64,
    #[serde(default)]
    pub test_results: Vec<TestResult>,
    pub total_tests: i64,
    pub passed_tests: i64,
}

/// Client for the code execution collaborator
#[derive(Clone)]
pub struct ExecutionClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExecutionClient {
    pub fn new(config: &CollaboratorConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.execution_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Judge a contest submission against its problem's test cases
    pub async fn judge(
        &self,
        problem_id: &Uuid,
        user_id: &Uuid,
        code: &str,
        language: &str,
        time_limit: u64,
        memory_limit: u64,
    ) -> AppResult<ExecutionResult> {
        let request = ExecutionRequest {
            code: code.to_string(),
            language: language.to_string(),
            test_cases: vec![],
            time_limit,
            memory_limit,
            problem_id: Some(problem_id.to_string()),
            user_id: Some(user_id.to_string()),
        };

        self.execute(&request).await
    }

    /// Raw execute call
    pub async fn execute(&self, request: &ExecutionRequest) -> AppResult<ExecutionResult> {
        let url = format!("{}/api/v1/execution/execute", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::ExecutionService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ExecutionService(format!(
                "execution service returned {}",
                response.status()
            )));
        }

        response
            .json::<ExecutionResult>()
            .await
            .map_err(|e| AppError::ExecutionService(format!("invalid response: {}", e)))
    }
}
