//! # sessionkv-core
//!
//! Core crate for SessionKV. Contains the keyed record store contract,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SessionKV crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
