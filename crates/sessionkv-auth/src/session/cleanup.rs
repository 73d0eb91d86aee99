//! Expired session sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};

use sessionkv_core::result::AppResult;
use sessionkv_core::traits::ScanFilter;
use sessionkv_entity::session::{SESSION_TABLE, SessionRecord};
use sessionkv_store::RecordMapper;

use super::repository::SessionRepository;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Expired sessions found by the scan.
    pub found: usize,
    /// Sessions deleted.
    pub deleted: usize,
    /// Deletions that failed and will be retried by a later pass.
    pub failed: usize,
}

impl SessionRepository {
    /// Deletes every session whose inactivity deadline has passed.
    pub async fn cleanup_expired_sessions(&self) -> AppResult<CleanupReport> {
        self.cleanup_expired_sessions_at(Utc::now()).await
    }

    /// Deletes every session expired as of `now`.
    ///
    /// The scan filters on the persisted deadline and each match is
    /// re-checked with the same rule `get_session` applies. Deletions run
    /// concurrently; a failed deletion is logged and does not stop the
    /// others. Only the scan itself can fail the pass.
    pub async fn cleanup_expired_sessions_at(&self, now: DateTime<Utc>) -> AppResult<CleanupReport> {
        let filter = ScanFilter::AtMost {
            field: "expires_at".to_string(),
            bound: now.timestamp_millis(),
        };

        let mut expired = Vec::new();
        for raw in self.mapper.store().scan(SESSION_TABLE, &filter).await? {
            let key = raw.key.clone();
            match RecordMapper::decode::<SessionRecord>(raw) {
                Ok(record) if record.is_expired_at(now) => expired.push(key),
                Ok(_) => {}
                Err(e) => {
                    warn!(session_id = %key, error = %e, "Removing undecodable session record");
                    expired.push(key);
                }
            }
        }

        let mut report = CleanupReport {
            found: expired.len(),
            ..CleanupReport::default()
        };
        if expired.is_empty() {
            return Ok(report);
        }

        info!(count = expired.len(), "Found expired sessions to clean up");

        let results: Vec<(String, AppResult<()>)> = stream::iter(expired)
            .map(|id| {
                let mapper = Arc::clone(&self.mapper);
                async move {
                    let result = mapper.store().delete(SESSION_TABLE, &id).await;
                    (id, result)
                }
            })
            .buffer_unordered(self.max_concurrent_deletes)
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    error!(session_id = %id, error = %e, "Failed to delete expired session");
                    report.failed += 1;
                }
            }
        }

        info!(
            deleted = report.deleted,
            failed = report.failed,
            "Session cleanup completed"
        );

        Ok(report)
    }
}
