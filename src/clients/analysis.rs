//! AI analysis service client

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::CollaboratorConfig,
    error::{AppError, AppResult},
};

/// Code analysis request wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_context: Option<String>,
}

/// Hint request wire format. hint_level ranges 1-5, vaguer to more direct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintRequest {
    pub problem_id: String,
    pub user_code: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_level: Option<i32>,
}

/// The analysis service responds with a free-form JSON document; we pass it
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult(pub serde_json::Value);

/// Client for the AI analysis collaborator
#[derive(Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(config: &CollaboratorConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.analysis_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request a code quality/complexity analysis
    pub async fn analyze_code(&self, request: &AnalyzeRequest) -> AppResult<AnalysisResult> {
        self.post("/api/v1/analysis/analyze", request).await
    }

    /// Request progressive hints for a problem
    pub async fn get_hint(&self, request: &HintRequest) -> AppResult<AnalysisResult> {
        self.post("/api/v1/analysis/hints", request).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> AppResult<AnalysisResult> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::AnalysisService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::AnalysisService(format!(
                "analysis service returned {}",
                response.status()
            )));
        }

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::AnalysisService(format!("invalid response: {}", e)))?;

        Ok(AnalysisResult(value))
    }
}
