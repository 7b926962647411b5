//! User handler implementations

use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    handlers::envelope::{ApiResponse, Paginated},
    middleware::auth::AuthenticatedUser,
    state::AppState,
};

use super::{
    request::{ListUsersQuery, UpdateUserRequest},
    response::ProfileResponse,
};

/// Get a public profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    let user = state.users().get_user(&id).await?;

    Ok(Json(ApiResponse::new(ProfileResponse::from(user))))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersQuery>,
) -> AppResult<Json<ApiResponse<Paginated<ProfileResponse>>>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let (users, total) = state
        .users()
        .list_users(page, per_page, params.search.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(Paginated {
        items: users.into_iter().map(ProfileResponse::from).collect(),
        total,
        page,
        per_page,
    })))
}

/// Update a profile (self or admin)
pub async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<ProfileResponse>>> {
    payload.validate()?;

    let user = state
        .users()
        .update_user(
            &auth_user.id,
            auth_user.is_admin(),
            &id,
            payload.display_name.as_deref(),
            payload.bio.as_deref(),
            payload.country.as_deref(),
            payload.current_password.as_deref(),
            payload.new_password.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::new(ProfileResponse::from(user))))
}
