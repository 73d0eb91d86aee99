//! Cron scheduler for periodic tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use sessionkv_auth::SessionRepository;
use sessionkv_core::config::CleanupConfig;
use sessionkv_core::error::AppError;

use crate::jobs::SessionCleanupJob;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Register the expired session sweep at the configured cadence
    pub async fn register_session_cleanup(
        &self,
        repository: Arc<SessionRepository>,
        config: &CleanupConfig,
    ) -> Result<(), AppError> {
        let job = SessionCleanupJob::new(repository);
        let cron = CronJob::new_async(config.cron.as_str(), move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                // Failures are logged by the job; the next tick retries.
                let _ = job.run().await;
            })
        })
        .map_err(|e| {
            AppError::scheduler(format!(
                "Failed to create session_cleanup schedule '{}': {e}",
                config.cron
            ))
        })?;

        self.scheduler.add(cron).await.map_err(|e| {
            AppError::scheduler(format!("Failed to add session_cleanup schedule: {e}"))
        })?;

        tracing::info!(cron = %config.cron, "Registered: session_cleanup");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::scheduler(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
