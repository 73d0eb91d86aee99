//! Built-in scheduled job implementations.

pub mod cleanup;

pub use cleanup::SessionCleanupJob;
