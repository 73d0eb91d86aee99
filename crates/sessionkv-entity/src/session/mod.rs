//! Session records and the sliding expiration rule.

pub mod expiry;
pub mod model;

pub use expiry::{inactivity_deadline, is_expired_at};
pub use model::{DEFAULT_MAX_INACTIVE_INTERVAL_SECONDS, SESSION_TABLE, SessionRecord};
