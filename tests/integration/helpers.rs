//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use sessionkv_auth::{AuthorizationCodeStore, SessionRepository};
use sessionkv_core::config::AppConfig;
use sessionkv_store::RecordMapper;
use sessionkv_store::memory::MemoryRecordStore;

/// Test application context
pub struct TestApp {
    /// Backing store for direct inspection
    pub store: MemoryRecordStore,
    /// Typed mapper shared by the repositories
    pub mapper: Arc<RecordMapper>,
    /// Session repository
    pub sessions: Arc<SessionRepository>,
    /// Authorization code store
    pub codes: AuthorizationCodeStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryRecordStore::new();
        let mapper = Arc::new(RecordMapper::from_store(Arc::new(store.clone())));
        let sessions = Arc::new(SessionRepository::from_config(
            Arc::clone(&mapper),
            &config.session,
        ));
        let codes = AuthorizationCodeStore::from_config(Arc::clone(&mapper), &config.authorization_code)
            .expect("Failed to build code store");

        Self {
            store,
            mapper,
            sessions,
            codes,
            config,
        }
    }
}

/// Instant `seconds` after the epoch
pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).expect("timestamp in range")
}
