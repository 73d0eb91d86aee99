//! Keyed record store trait for pluggable persistence backends.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Read consistency requested for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadConsistency {
    /// Reflects every write that completed before the read started.
    #[default]
    Consistent,
    /// May observe stale data.
    Eventual,
}

/// A record as seen by a backend: primary key, JSON document, and the
/// secondary index entries it is reachable through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Primary key within the table.
    pub key: String,
    /// The persisted document.
    pub document: serde_json::Value,
    /// Secondary index name → index value.
    #[serde(default)]
    pub indexes: BTreeMap<String, String>,
}

impl RawRecord {
    /// Create a record without index entries.
    pub fn new(key: impl Into<String>, document: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            document,
            indexes: BTreeMap::new(),
        }
    }

    /// Add a secondary index entry.
    pub fn with_index(mut self, index_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.indexes.insert(index_name.into(), value.into());
        self
    }
}

/// Filter applied to every document of a table scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFilter {
    /// Match every record.
    All,
    /// Match records whose integer field is present and `<= bound`.
    /// Records where the field is missing or `null` never match.
    AtMost {
        /// Top-level document field.
        field: String,
        /// Inclusive upper bound.
        bound: i64,
    },
}

impl ScanFilter {
    /// Evaluate the filter against a document.
    pub fn matches(&self, document: &serde_json::Value) -> bool {
        match self {
            Self::All => true,
            Self::AtMost { field, bound } => document
                .get(field)
                .and_then(serde_json::Value::as_i64)
                .is_some_and(|value| value <= *bound),
        }
    }
}

/// Trait for table-oriented key-value backends (Redis, in-memory).
///
/// Deletes are keyed by primary key only and are idempotent. Backends
/// perform no retries; failures surface as `ErrorKind::Store`.
#[async_trait]
pub trait KeyedRecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a record by primary key.
    async fn load(
        &self,
        table: &str,
        key: &str,
        consistency: ReadConsistency,
    ) -> AppResult<Option<RawRecord>>;

    /// Insert or fully replace a record, including its index entries.
    async fn save(&self, table: &str, record: RawRecord) -> AppResult<()>;

    /// Delete a record by primary key. Deleting a missing key is not an error.
    async fn delete(&self, table: &str, key: &str) -> AppResult<()>;

    /// Delete a record if it exists.
    /// Returns `true` only for the caller whose delete removed the record.
    async fn delete_if_exists(&self, table: &str, key: &str) -> AppResult<bool>;

    /// Return every record whose `index_name` entry equals `index_value`.
    async fn query(
        &self,
        table: &str,
        index_name: &str,
        index_value: &str,
        consistency: ReadConsistency,
    ) -> AppResult<Vec<RawRecord>>;

    /// Return every record of the table that matches `filter`.
    async fn scan(&self, table: &str, filter: &ScanFilter) -> AppResult<Vec<RawRecord>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
