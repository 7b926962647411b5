//! Contest management handlers

mod handler;
pub mod request;
pub mod response;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Contest routes
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handler::list_contests))
        .route("/{id}", get(handler::get_contest))
        .route("/{id}/participants", get(handler::list_participants))
        .route("/{id}/leaderboard", get(handler::get_leaderboard));

    let protected = Router::new()
        .route("/", post(handler::create_contest))
        .route("/{id}", patch(handler::update_contest))
        .route("/{id}", delete(handler::delete_contest))
        .route("/{id}/register", post(handler::register_for_contest))
        .route("/{id}/register", delete(handler::unregister_from_contest))
        .route("/{id}/submissions", post(handler::submit_solution))
        .route("/{id}/submissions", get(handler::list_own_submissions))
        .route("/{id}/submissions/{submission_id}", get(handler::get_submission))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
