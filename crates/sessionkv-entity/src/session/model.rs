//! Session record model.

use std::collections::HashMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use sessionkv_core::traits::Record;

use super::expiry;

/// Table holding session records.
pub const SESSION_TABLE: &str = "authentication_session";

/// Inactivity interval applied when nothing else is configured (30 minutes).
pub const DEFAULT_MAX_INACTIVE_INTERVAL_SECONDS: i64 = 1800;

/// The persisted shape of one browser session.
///
/// Timestamps are stored as epoch milliseconds and are truncated to that
/// precision whenever they are set, so a loaded record equals the saved one. `expires_at` is derived
/// from `last_accessed_time` and the interval; it exists so that the
/// sweep can filter on it and is recomputed by [`SessionRecord::refresh_expiry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Random session identifier.
    pub id: String,
    /// When the session was created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub creation_time: DateTime<Utc>,
    /// Last explicit access.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_accessed_time: DateTime<Utc>,
    /// Inactivity interval; negative means never expires.
    pub max_inactive_interval_seconds: i64,
    /// Free-form session attributes.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    /// Derived inactivity deadline, `None` for sessions that never expire.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Create a record accessed for the first time at `now`.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>, max_inactive_interval_seconds: i64) -> Self {
        let now = now.trunc_subsecs(3);
        let mut record = Self {
            id: id.into(),
            creation_time: now,
            last_accessed_time: now,
            max_inactive_interval_seconds,
            attributes: HashMap::new(),
            expires_at: None,
        };
        record.refresh_expiry();
        record
    }

    /// A record carrying only the primary key, used to address deletes.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(id, DateTime::<Utc>::default(), DEFAULT_MAX_INACTIVE_INTERVAL_SECONDS)
    }

    /// Inactivity deadline computed from the current fields.
    pub fn expiry_deadline(&self) -> Option<DateTime<Utc>> {
        expiry::inactivity_deadline(self.last_accessed_time, self.max_inactive_interval_seconds)
    }

    /// Record an access at `time`, truncated to milliseconds and never
    /// earlier than the creation time.
    pub fn set_last_accessed_time(&mut self, time: DateTime<Utc>) {
        self.last_accessed_time = time.trunc_subsecs(3).max(self.creation_time);
        self.refresh_expiry();
    }

    /// Recompute `expires_at` after a timestamp or interval change.
    pub fn refresh_expiry(&mut self) {
        self.expires_at = self.expiry_deadline();
    }

    /// Whether the record is expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expiry::is_expired_at(self.last_accessed_time, self.max_inactive_interval_seconds, now)
    }
}

impl Record for SessionRecord {
    const TABLE: &'static str = SESSION_TABLE;

    fn primary_key(&self) -> &str {
        &self.id
    }
}
