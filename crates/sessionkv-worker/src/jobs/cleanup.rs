//! Expired session sweep job.

use std::sync::Arc;

use sessionkv_auth::{CleanupReport, SessionRepository};
use sessionkv_core::result::AppResult;

/// Runs one sweep pass over the session table.
#[derive(Debug, Clone)]
pub struct SessionCleanupJob {
    /// Session repository
    repository: Arc<SessionRepository>,
}

impl SessionCleanupJob {
    /// Create a new session cleanup job
    pub fn new(repository: Arc<SessionRepository>) -> Self {
        Self { repository }
    }

    /// Run one pass, logging the outcome.
    ///
    /// A failed pass is logged and returned; the next tick tries again.
    pub async fn run(&self) -> AppResult<CleanupReport> {
        tracing::debug!("Running session cleanup");

        match self.repository.cleanup_expired_sessions().await {
            Ok(report) => {
                if report.failed > 0 {
                    tracing::warn!(
                        found = report.found,
                        deleted = report.deleted,
                        failed = report.failed,
                        "Session cleanup left sessions behind"
                    );
                } else {
                    tracing::debug!(
                        found = report.found,
                        deleted = report.deleted,
                        "Session cleanup pass finished"
                    );
                }
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session cleanup failed");
                Err(e)
            }
        }
    }
}
