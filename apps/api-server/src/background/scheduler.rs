//! Periodic post counter reconciliation on tokio-cron-scheduler.

use std::sync::Arc;

use inkpost_core::PostService;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

/// Every hour, on the hour.
const DEFAULT_RECONCILE_CRON: &str = "0 0 * * * *";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Six-field cron expression (seconds first).
    pub reconcile_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reconcile_cron: DEFAULT_RECONCILE_CRON.to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Reads `SCHEDULER_ENABLED` and `RECONCILE_CRON`.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            reconcile_cron: std::env::var("RECONCILE_CRON")
                .unwrap_or_else(|_| DEFAULT_RECONCILE_CRON.to_string()),
        }
    }
}

/// Owns the job scheduler for the lifetime of the server.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Register the job that repairs drifted user post counters.
    pub async fn add_reconciliation(
        &self,
        posts: Arc<PostService>,
    ) -> Result<Uuid, JobSchedulerError> {
        let schedule = self.config.reconcile_cron.as_str();

        let job = Job::new_async(schedule, move |_id, _lock| {
            let posts = posts.clone();
            Box::pin(async move {
                match posts.reconcile_post_counts().await {
                    Ok(0) => tracing::debug!("Post counters consistent"),
                    Ok(fixed) => tracing::info!(fixed, "Reconciled user post counters"),
                    Err(e) => tracing::error!(error = %e, "Post counter reconciliation failed"),
                }
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Counter reconciliation scheduled");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}
