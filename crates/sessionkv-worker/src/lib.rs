//! Scheduled background tasks for SessionKV.
//!
//! This crate provides:
//! - A cron scheduler that drives periodic tasks
//! - The expired session sweep job

pub mod jobs;
pub mod scheduler;

pub use jobs::SessionCleanupJob;
pub use scheduler::CronScheduler;
