//! Authentication handlers

mod handler;
pub mod request;
pub mod response;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Authentication routes
pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/refresh", post(handler::refresh_token))
        .route("/verify-email", post(handler::verify_email))
        .route("/forgot-password", post(handler::forgot_password))
        .route("/reset-password", post(handler::reset_password));

    let protected = Router::new()
        .route("/logout", post(handler::logout))
        .route("/logout-all", post(handler::logout_all))
        .route("/me", get(handler::get_current_user))
        .route("/sessions", get(handler::list_sessions))
        .route("/sessions/{id}", delete(handler::revoke_session))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
