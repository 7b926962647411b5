//! Shared application state
//!
//! Handlers receive this through Axum's `State` extractor. Services are
//! built once in `main` and live here for the life of the process.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{
    clients::AnalysisClient,
    config::Config,
    services::{AuthService, ContestService, NotificationService, SubmissionService, UserService},
};

/// Shared application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: PgPool,
    redis: ConnectionManager,
    config: Config,
    auth: AuthService,
    users: UserService,
    contests: ContestService,
    submissions: SubmissionService,
    notifications: NotificationService,
    analysis: AnalysisClient,
}

impl AppState {
    /// Create a new application state
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        config: Config,
        auth: AuthService,
        users: UserService,
        contests: ContestService,
        submissions: SubmissionService,
        notifications: NotificationService,
        analysis: AnalysisClient,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                config,
                auth,
                users,
                contests,
                submissions,
                notifications,
                analysis,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    pub fn contests(&self) -> &ContestService {
        &self.inner.contests
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.inner.submissions
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.inner.notifications
    }

    pub fn analysis(&self) -> &AnalysisClient {
        &self.inner.analysis
    }
}
