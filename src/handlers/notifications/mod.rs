//! Notification handlers

mod handler;
pub mod request;
pub mod response;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Notification routes (all require authentication)
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_notifications))
        .route("/", post(handler::create_notification))
        .route("/unread-count", get(handler::unread_count))
        .route("/read-all", post(handler::mark_all_read))
        .route("/preferences", get(handler::get_preferences))
        .route("/preferences", put(handler::update_preference))
        .route("/{id}/read", post(handler::mark_read))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
