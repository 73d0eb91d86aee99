//! # sessionkv-store
//!
//! Keyed record store implementations for SessionKV. Supports two modes:
//!
//! - **memory**: In-process tables using [dashmap](https://crates.io/crates/dashmap)
//! - **redis**: Redis-backed tables using the [redis](https://crates.io/crates/redis) crate
//!
//! The backend is selected at runtime based on configuration and wrapped
//! in a typed [`RecordMapper`].

pub mod keys;
pub mod mapper;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use mapper::RecordMapper;
