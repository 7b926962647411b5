//! Analysis handler implementations

use axum::{Json, extract::State};

use crate::{
    clients::analysis::{AnalyzeRequest, HintRequest},
    error::AppResult,
    handlers::envelope::ApiResponse,
    middleware::auth::AuthenticatedUser,
    state::AppState,
};

/// Proxy a code analysis request
pub async fn analyze_code(
    State(state): State<AppState>,
    _auth_user: AuthenticatedUser,
    Json(payload): Json<AnalyzeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = state.analysis().analyze_code(&payload).await?;

    Ok(Json(ApiResponse::new(result.0)))
}

/// Proxy a hint request
pub async fn get_hint(
    State(state): State<AppState>,
    _auth_user: AuthenticatedUser,
    Json(payload): Json<HintRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let result = state.analysis().get_hint(&payload).await?;

    Ok(Json(ApiResponse::new(result.0)))
}
