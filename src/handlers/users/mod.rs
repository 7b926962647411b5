//! User profile handlers

mod handler;
pub mod request;
pub mod response;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// User routes
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(handler::list_users))
        .route("/{id}", get(handler::get_user));

    let protected = Router::new()
        .route("/{id}", patch(handler::update_user))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
