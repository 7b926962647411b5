//! Redis-backed request throttling
//!
//! Fixed-window counters: the key embeds the window start, so a new window
//! means a new key and the TTL only garbage-collects old ones. Counter and
//! TTL are written in one atomic pipeline.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::net::SocketAddr;

use crate::{constants::rate_limits, error::AppError, state::AppState};

/// Which throttling budget a request falls under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteClass {
    Auth,
    Submissions,
    Contests,
    Notifications,
    General,
}

impl RouteClass {
    fn of(path: &str) -> Self {
        if path.contains("/submissions") {
            return Self::Submissions;
        }
        match path.strip_prefix("/api/v1/").and_then(|p| p.split('/').next()) {
            Some("auth") => Self::Auth,
            Some("contests") => Self::Contests,
            Some("notifications") => Self::Notifications,
            _ => Self::General,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Submissions => "submissions",
            Self::Contests => "contests",
            Self::Notifications => "notifications",
            Self::General => "general",
        }
    }

    /// (max requests, window seconds). Auth is strict to slow down
    /// credential stuffing; judging is expensive.
    fn budget(self) -> (i64, i64) {
        match self {
            Self::Auth => (rate_limits::AUTH_MAX_REQUESTS, rate_limits::AUTH_WINDOW_SECS),
            Self::Submissions => (
                rate_limits::SUBMISSION_MAX_REQUESTS,
                rate_limits::SUBMISSION_WINDOW_SECS,
            ),
            _ => (
                rate_limits::GENERAL_MAX_REQUESTS,
                rate_limits::GENERAL_WINDOW_SECS,
            ),
        }
    }
}

/// Rate limit middleware. When Redis is unreachable traffic passes through
/// instead of turning into 500s.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let class = RouteClass::of(request.uri().path());
    let (max_requests, window_secs) = class.budget();

    let window_start = Utc::now().timestamp() / window_secs * window_secs;
    let key = format!(
        "throttle:{}:{}:{}",
        class.label(),
        addr.ip(),
        window_start
    );

    let counted: Result<(i64,), redis::RedisError> = redis::pipe()
        .atomic()
        .incr(&key, 1)
        .expire(&key, window_secs)
        .ignore()
        .query_async(&mut state.redis())
        .await;

    match counted {
        Ok((count,)) if count > max_requests => Err(AppError::TooManyRequests),
        _ => Ok(next.run(request).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_classification() {
        assert_eq!(RouteClass::of("/api/v1/auth/login"), RouteClass::Auth);
        assert_eq!(
            RouteClass::of("/api/v1/contests/abc/submissions"),
            RouteClass::Submissions
        );
        assert_eq!(
            RouteClass::of("/api/v1/contests/abc/leaderboard"),
            RouteClass::Contests
        );
        assert_eq!(
            RouteClass::of("/api/v1/notifications/unread-count"),
            RouteClass::Notifications
        );
        assert_eq!(RouteClass::of("/api/v1/users/abc"), RouteClass::General);
        assert_eq!(RouteClass::of("/api/v1/health"), RouteClass::General);
    }

    #[test]
    fn test_auth_budget_is_strictest() {
        let (auth_limit, _) = RouteClass::Auth.budget();
        let (general_limit, _) = RouteClass::General.budget();
        assert!(auth_limit < general_limit);
    }
}
