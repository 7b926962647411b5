//! Expiry sweep
//!
//! Periodically clears expired sessions, consumed auth tokens, and stale
//! notifications. Expired rows are also rejected inline on lookup, so this
//! job is storage hygiene: skipping a run never affects correctness.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    config::ScheduleConfig,
    db::repositories::{AuthTokenRepository, NotificationRepository, SessionRepository},
};

/// Statistics from one sweep run
#[derive(Debug, Default)]
pub struct SweepStats {
    pub sessions_deleted: u64,
    pub tokens_deleted: u64,
    pub notifications_deleted: u64,
}

/// Sweep job runner
pub struct SweepRunner {
    db_pool: PgPool,
    notification_retention_days: i64,
}

impl SweepRunner {
    pub fn new(db_pool: PgPool, notification_retention_days: i64) -> Self {
        Self {
            db_pool,
            notification_retention_days,
        }
    }

    /// Run one full sweep
    pub async fn run(&self) -> Result<SweepStats> {
        let stats = SweepStats {
            sessions_deleted: SessionRepository::delete_expired(&self.db_pool).await?,
            tokens_deleted: AuthTokenRepository::delete_expired(&self.db_pool).await?,
            notifications_deleted: NotificationRepository::delete_expired(
                &self.db_pool,
                self.notification_retention_days,
            )
            .await?,
        };

        tracing::info!(
            sessions = stats.sessions_deleted,
            tokens = stats.tokens_deleted,
            notifications = stats.notifications_deleted,
            "Expiry sweep completed"
        );

        Ok(stats)
    }
}

/// Cron scheduler wrapping the sweep job
pub struct SweepScheduler {
    scheduler: JobScheduler,
}

impl SweepScheduler {
    /// Build the scheduler, register the sweep job, and start it
    pub async fn start(config: &ScheduleConfig, db_pool: PgPool) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        let runner = Arc::new(SweepRunner::new(
            db_pool,
            config.notification_retention_days,
        ));

        let job = Job::new_async(config.sweep_schedule.as_str(), move |_uuid, _lock| {
            let runner = runner.clone();
            Box::pin(async move {
                if let Err(e) = runner.run().await {
                    tracing::error!("Expiry sweep failed: {}", e);
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        tracing::info!(schedule = %config.sweep_schedule, "Expiry sweep scheduled");

        Ok(Self { scheduler })
    }

    /// Shutdown the scheduler gracefully
    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}
