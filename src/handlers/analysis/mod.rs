//! AI analysis proxy handlers
//!
//! Thin authenticated pass-throughs to the analysis collaborator.

mod handler;

use axum::{Router, middleware, routing::post};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Analysis routes (all require authentication)
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/code", post(handler::analyze_code))
        .route("/hint", post(handler::get_hint))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
