//! Contest handler implementations

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    handlers::envelope::{ApiResponse, Paginated},
    middleware::auth::AuthenticatedUser,
    services::scoreboard::ParticipantStanding,
    state::AppState,
};

use super::{
    request::{
        CreateContestRequest, LeaderboardQuery, ListContestsQuery, RegisterRequest,
        SubmitSolutionRequest, UpdateContestRequest,
    },
    response::{
        ContestResponse, LeaderboardResponse, RegistrationResponse, SubmissionResponse,
    },
};

/// Create a new contest (organizers and admins)
pub async fn create_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateContestRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ContestResponse>>)> {
    payload.validate()?;

    if !auth_user.can_manage_contests() {
        return Err(AppError::Forbidden(
            "Only organizers can create contests".to_string(),
        ));
    }

    let contest = state.contests().create_contest(&auth_user.id, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ContestResponse::from(contest))),
    ))
}

/// List contests
pub async fn list_contests(
    State(state): State<AppState>,
    Query(params): Query<ListContestsQuery>,
) -> AppResult<Json<ApiResponse<Paginated<ContestResponse>>>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let (contests, total) = state
        .contests()
        .list_contests(page, per_page, params.status.as_deref(), params.search.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(Paginated {
        items: contests.into_iter().map(ContestResponse::from).collect(),
        total,
        page,
        per_page,
    })))
}

/// Get contest detail
pub async fn get_contest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ContestResponse>>> {
    let contest = state.contests().get_contest(&id).await?;

    Ok(Json(ApiResponse::new(ContestResponse::from(contest))))
}

/// Update contest
pub async fn update_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContestRequest>,
) -> AppResult<Json<ApiResponse<ContestResponse>>> {
    payload.validate()?;

    let contest = state
        .contests()
        .update_contest(&id, &auth_user.id, auth_user.is_admin(), payload)
        .await?;

    Ok(Json(ApiResponse::new(ContestResponse::from(contest))))
}

/// Delete contest
pub async fn delete_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .contests()
        .delete_contest(&id, &auth_user.id, auth_user.is_admin())
        .await?;

    Ok(Json(ApiResponse::with_message((), "Contest deleted")))
}

/// Register the current user for a contest
pub async fn register_for_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RegisterRequest>>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegistrationResponse>>)> {
    let team_name = match payload {
        Some(Json(request)) => {
            request.validate()?;
            request.team_name
        }
        None => None,
    };

    let participant = state
        .contests()
        .register_participant(&id, &auth_user.id, team_name.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            RegistrationResponse::from(participant),
            "Successfully registered for contest",
        )),
    ))
}

/// Unregister the current user from an upcoming contest
pub async fn unregister_from_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .contests()
        .unregister_participant(&id, &auth_user.id)
        .await?;

    Ok(Json(ApiResponse::with_message((), "Registration cancelled")))
}

/// List participants
pub async fn list_participants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<ParticipantView>>>> {
    let participants = state.contests().list_participants(&id).await?;

    Ok(Json(ApiResponse::new(
        participants.into_iter().map(ParticipantView::from).collect(),
    )))
}

/// Public participant row
#[derive(Debug, serde::Serialize)]
pub struct ParticipantView {
    pub user_id: Uuid,
    pub username: String,
    pub team_name: Option<String>,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

impl From<ParticipantStanding> for ParticipantView {
    fn from(standing: ParticipantStanding) -> Self {
        Self {
            user_id: standing.user_id,
            username: standing.username,
            team_name: standing.team_name,
            registered_at: standing.registered_at,
        }
    }
}

/// Get the leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<LeaderboardQuery>,
) -> AppResult<Json<ApiResponse<LeaderboardResponse>>> {
    let view = state.contests().get_leaderboard(&id, params.limit).await?;

    Ok(Json(ApiResponse::new(LeaderboardResponse::from(view))))
}

/// Submit a solution for judging
pub async fn submit_solution(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitSolutionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SubmissionResponse>>)> {
    payload.validate()?;

    let submission = state
        .submissions()
        .submit(
            &id,
            &auth_user.id,
            &payload.problem_id,
            &payload.language,
            &payload.source_code,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(SubmissionResponse::from(submission))),
    ))
}

/// The current user's submissions in this contest
pub async fn list_own_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<SubmissionResponse>>>> {
    let submissions = state
        .submissions()
        .list_own_submissions(&id, &auth_user.id)
        .await?;

    Ok(Json(ApiResponse::new(
        submissions.into_iter().map(SubmissionResponse::from).collect(),
    )))
}

/// One submission by id (own, or any for admins)
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((_contest_id, submission_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<SubmissionResponse>>> {
    let submission = state
        .submissions()
        .get_submission(&submission_id, &auth_user.id, auth_user.is_admin())
        .await?;

    Ok(Json(ApiResponse::new(SubmissionResponse::from(submission))))
}
