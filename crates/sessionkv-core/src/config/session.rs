//! Session repository configuration.

use serde::{Deserialize, Serialize};

/// Session repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity interval in seconds assigned to newly created sessions.
    /// A negative value means sessions never expire.
    #[serde(default = "default_max_inactive_interval")]
    pub default_max_inactive_interval_seconds: i64,
    /// Expired session sweep configuration.
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_max_inactive_interval_seconds: default_max_inactive_interval(),
            cleanup: CleanupConfig::default(),
        }
    }
}

/// Expired session sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Whether the periodic sweep is scheduled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds) for the sweep.
    #[serde(default = "default_cron")]
    pub cron: String,
    /// Upper bound on deletions in flight during one sweep pass.
    #[serde(default = "default_max_concurrent_deletes")]
    pub max_concurrent_deletes: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cron: default_cron(),
            max_concurrent_deletes: default_max_concurrent_deletes(),
        }
    }
}

fn default_max_inactive_interval() -> i64 {
    1800
}

fn default_true() -> bool {
    true
}

fn default_cron() -> String {
    "0 * * * * *".to_string()
}

fn default_max_concurrent_deletes() -> usize {
    16
}
