//! Authentication handler implementations

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    handlers::envelope::ApiResponse,
    middleware::auth::AuthenticatedUser,
    models::DeviceInfo,
    state::AppState,
    utils::validation::validate_password,
};

use super::{
    request::{
        ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
        ResetPasswordRequest, VerifyEmailRequest,
    },
    response::{AuthResponse, RefreshResponse, SessionResponse, UserResponse},
};

fn device_info(
    device_name: Option<String>,
    headers: &HeaderMap,
    addr: &SocketAddr,
) -> DeviceInfo {
    DeviceInfo {
        device_name,
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        ip_address: Some(addr.ip().to_string()),
    }
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    payload.validate()?;
    crate::utils::validation::validate_username(&payload.username)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    validate_password(&payload.password).map_err(|e| AppError::Validation(e.to_string()))?;

    let device = device_info(payload.device_name.clone(), &headers, &addr);

    let (user, tokens) = state
        .auth()
        .register(
            &payload.username,
            &payload.email,
            &payload.password,
            payload.display_name.as_deref(),
            &device,
        )
        .await?;

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.expires_in,
        user: UserResponse::from(user),
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            response,
            "User registered successfully, check your email for a verification token",
        )),
    ))
}

/// Login with username/email and password
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let device = device_info(payload.device_name.clone(), &headers, &addr);

    let (user, tokens) = state
        .auth()
        .login(&payload.identifier, &payload.password, &device)
        .await?;

    let response = AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.expires_in,
        user: UserResponse::from(user),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// Rotate a refresh token into a new pair
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> AppResult<Json<ApiResponse<RefreshResponse>>> {
    let (_, tokens) = state.auth().refresh(&payload.refresh_token).await?;

    let response = RefreshResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.expires_in,
    };

    Ok(Json(ApiResponse::new(response)))
}

/// Logout the current session
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .auth()
        .logout(&auth_user.id, &auth_user.session_id)
        .await?;

    Ok(Json(ApiResponse::with_message((), "Logged out successfully")))
}

/// Logout every session for the current user
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let revoked = state.auth().logout_all(&auth_user.id).await?;

    Ok(Json(ApiResponse::with_message(
        serde_json::json!({ "revoked_sessions": revoked }),
        "Logged out everywhere",
    )))
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .auth()
        .get_user_by_id(&auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::new(UserResponse::from(user))))
}

/// List the current user's device sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<SessionResponse>>>> {
    let sessions = state.auth().list_sessions(&auth_user.id).await?;

    let responses = sessions
        .into_iter()
        .map(|s| SessionResponse::from_session(s, &auth_user.session_id))
        .collect();

    Ok(Json(ApiResponse::new(responses)))
}

/// Revoke one session by id
pub async fn revoke_session(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.auth().logout(&auth_user.id, &session_id).await?;

    Ok(Json(ApiResponse::with_message((), "Session revoked")))
}

/// Consume an email verification token
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.auth().verify_email(&payload.token).await?;

    Ok(Json(ApiResponse::with_message((), "Email verified")))
}

/// Start a password reset
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.validate()?;

    state.auth().request_password_reset(&payload.email).await?;

    Ok(Json(ApiResponse::with_message(
        (),
        "If that address is registered, a reset token is on its way",
    )))
}

/// Complete a password reset
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.validate()?;
    validate_password(&payload.new_password)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .auth()
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::with_message(
        (),
        "Password updated, log in with your new password",
    )))
}
