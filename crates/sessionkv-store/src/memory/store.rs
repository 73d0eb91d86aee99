//! In-memory record store implementation using the dashmap crate.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use sessionkv_core::result::AppResult;
use sessionkv_core::traits::record_store::{
    KeyedRecordStore, RawRecord, ReadConsistency, ScanFilter,
};

/// In-memory record store for single-node deployments and tests.
///
/// Each table is one dashmap shard entry, so every operation on a table
/// is serialized and all reads are consistent regardless of the
/// requested [`ReadConsistency`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    /// Table name → primary key → record.
    tables: Arc<DashMap<String, HashMap<String, RawRecord>>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in a table.
    pub fn record_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |records| records.len())
    }
}

#[async_trait]
impl KeyedRecordStore for MemoryRecordStore {
    async fn load(
        &self,
        table: &str,
        key: &str,
        _consistency: ReadConsistency,
    ) -> AppResult<Option<RawRecord>> {
        Ok(self
            .tables
            .get(table)
            .and_then(|records| records.get(key).cloned()))
    }

    async fn save(&self, table: &str, record: RawRecord) -> AppResult<()> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(record.key.clone(), record);
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> AppResult<()> {
        self.delete_if_exists(table, key).await?;
        Ok(())
    }

    async fn delete_if_exists(&self, table: &str, key: &str) -> AppResult<bool> {
        let removed = self
            .tables
            .get_mut(table)
            .is_some_and(|mut records| records.remove(key).is_some());
        Ok(removed)
    }

    async fn query(
        &self,
        table: &str,
        index_name: &str,
        index_value: &str,
        _consistency: ReadConsistency,
    ) -> AppResult<Vec<RawRecord>> {
        let Some(records) = self.tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(records
            .values()
            .filter(|record| {
                record
                    .indexes
                    .get(index_name)
                    .is_some_and(|value| value == index_value)
            })
            .cloned()
            .collect())
    }

    async fn scan(&self, table: &str, filter: &ScanFilter) -> AppResult<Vec<RawRecord>> {
        let Some(records) = self.tables.get(table) else {
            return Ok(Vec::new());
        };
        let matched: Vec<RawRecord> = records
            .values()
            .filter(|record| filter.matches(&record.document))
            .cloned()
            .collect();
        debug!(table, scanned = records.len(), matched = matched.len(), "Scanned table");
        Ok(matched)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
