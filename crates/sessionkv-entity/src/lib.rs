//! # sessionkv-entity
//!
//! Persisted record models for SessionKV. Every struct in this crate is
//! the document shape of one record store table, or a value object
//! carried inside one. Transient coordination state (such as whether a
//! session has been saved yet) lives in `sessionkv-auth`.

pub mod code;
pub mod session;
