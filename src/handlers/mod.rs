//! HTTP handlers, one directory per domain
//!
//! Routers that need authentication take the state up front so the auth
//! middleware can be attached per route group.

pub mod analysis;
pub mod auth;
pub mod contests;
pub mod envelope;
pub mod health;
pub mod notifications;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/auth", auth::routes(state.clone()))
        .nest("/users", users::routes(state.clone()))
        .nest("/contests", contests::routes(state.clone()))
        .nest("/notifications", notifications::routes(state.clone()))
        .nest("/analysis", analysis::routes(state))
}
