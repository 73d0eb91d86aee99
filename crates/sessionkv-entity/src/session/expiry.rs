//! Sliding-window expiration.
//!
//! Both the lazy check on load and the eager sweep go through these two
//! functions so they can never disagree about whether a session is expired.

use chrono::{DateTime, TimeDelta, Utc};

/// Instant at which a session last accessed at `last_accessed` becomes
/// expired, or `None` if it never expires.
///
/// A negative interval means "never expires". An interval too large to
/// represent is treated the same way.
pub fn inactivity_deadline(
    last_accessed: DateTime<Utc>,
    max_inactive_interval_seconds: i64,
) -> Option<DateTime<Utc>> {
    if max_inactive_interval_seconds < 0 {
        return None;
    }
    TimeDelta::try_seconds(max_inactive_interval_seconds)
        .and_then(|interval| last_accessed.checked_add_signed(interval))
}

/// Whether `now - last_accessed >= max_inactive_interval_seconds`.
pub fn is_expired_at(
    last_accessed: DateTime<Utc>,
    max_inactive_interval_seconds: i64,
    now: DateTime<Utc>,
) -> bool {
    inactivity_deadline(last_accessed, max_inactive_interval_seconds)
        .is_some_and(|deadline| now >= deadline)
}
