//! Notification handler implementations

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    handlers::envelope::{ApiResponse, Paginated},
    middleware::auth::AuthenticatedUser,
    services::notification_service::CreateNotification,
    state::AppState,
};

use super::{
    request::{CreateNotificationRequest, ListNotificationsQuery, UpdatePreferenceRequest},
    response::{NotificationResponse, PreferenceResponse, UnreadCountResponse},
};

/// Fan a notification out to one or many users (admin only)
pub async fn create_notification(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateNotificationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vec<NotificationResponse>>>)> {
    if !auth_user.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators can send notifications".to_string(),
        ));
    }

    let request = CreateNotification {
        user_id: payload.user_id,
        user_ids: payload.user_ids,
        kind: payload.kind,
        channel: payload.channel,
        payload: payload.payload,
        expires_at: payload.expires_at,
    };

    let created = state.notifications().create(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            created.into_iter().map(NotificationResponse::from).collect(),
        )),
    ))
}

/// List the current user's notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(params): Query<ListNotificationsQuery>,
) -> AppResult<Json<ApiResponse<Paginated<NotificationResponse>>>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let (notifications, total) = state
        .notifications()
        .list(&auth_user.id, page, per_page, params.unread_only.unwrap_or(false))
        .await?;

    Ok(Json(ApiResponse::new(Paginated {
        items: notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
        total,
        page,
        per_page,
    })))
}

/// Unread count
pub async fn unread_count(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let unread = state.notifications().unread_count(&auth_user.id).await?;

    Ok(Json(ApiResponse::new(UnreadCountResponse { unread })))
}

/// Mark one notification read
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.notifications().mark_read(&id, &auth_user.id).await?;

    Ok(Json(ApiResponse::with_message((), "Notification marked as read")))
}

/// Mark every notification read
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let updated = state.notifications().mark_all_read(&auth_user.id).await?;

    Ok(Json(ApiResponse::with_message(
        serde_json::json!({ "marked_read": updated }),
        "All notifications marked as read",
    )))
}

/// The current user's preference rows
pub async fn get_preferences(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<PreferenceResponse>>>> {
    let preferences = state.notifications().preferences(&auth_user.id).await?;

    Ok(Json(ApiResponse::new(
        preferences.into_iter().map(PreferenceResponse::from).collect(),
    )))
}

/// Upsert one preference row
pub async fn update_preference(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<UpdatePreferenceRequest>,
) -> AppResult<Json<ApiResponse<PreferenceResponse>>> {
    let preference = state
        .notifications()
        .update_preference(
            &auth_user.id,
            payload.kind,
            payload.email_enabled,
            payload.in_app_enabled,
        )
        .await?;

    Ok(Json(ApiResponse::new(PreferenceResponse::from(preference))))
}
