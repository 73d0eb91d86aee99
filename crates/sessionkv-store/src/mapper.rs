//! Typed record mapper that dispatches to the configured store backend.

use std::sync::Arc;

use tracing::info;

use sessionkv_core::config::store::StoreConfig;
use sessionkv_core::error::{AppError, ErrorKind};
use sessionkv_core::result::AppResult;
use sessionkv_core::traits::record::Record;
use sessionkv_core::traits::record_store::{
    KeyedRecordStore, RawRecord, ReadConsistency, ScanFilter,
};

/// Record mapper that wraps the configured keyed record store.
///
/// The backend is selected at construction time based on configuration.
/// Records are converted to and from JSON documents here so that
/// backends only ever see [`RawRecord`]s.
#[derive(Debug, Clone)]
pub struct RecordMapper {
    /// The inner record store.
    inner: Arc<dyn KeyedRecordStore>,
}

impl RecordMapper {
    /// Create a new record mapper from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyedRecordStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis record store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisRecordStore::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory record store");
                Arc::new(crate::memory::MemoryRecordStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a record mapper from an existing store (for testing).
    pub fn from_store(store: Arc<dyn KeyedRecordStore>) -> Self {
        Self { inner: store }
    }

    /// Get a reference to the inner store.
    pub fn store(&self) -> &dyn KeyedRecordStore {
        self.inner.as_ref()
    }

    /// Load a record by primary key.
    pub async fn load<R: Record>(
        &self,
        key: &str,
        consistency: ReadConsistency,
    ) -> AppResult<Option<R>> {
        match self.inner.load(R::TABLE, key, consistency).await? {
            Some(raw) => Ok(Some(Self::decode(raw)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a record that has no secondary index entries.
    pub async fn save<R: Record>(&self, record: &R) -> AppResult<()> {
        self.save_indexed(record, std::iter::empty::<(String, String)>())
            .await
    }

    /// Insert or replace a record together with its secondary index entries.
    pub async fn save_indexed<R, I>(&self, record: &R, indexes: I) -> AppResult<()>
    where
        R: Record,
        I: IntoIterator<Item = (String, String)>,
    {
        let document = serde_json::to_value(record)?;
        let mut raw = RawRecord::new(record.primary_key(), document);
        raw.indexes.extend(indexes);
        self.inner.save(R::TABLE, raw).await
    }

    /// Delete a record, addressed by its primary key only.
    pub async fn delete<R: Record>(&self, record: &R) -> AppResult<()> {
        self.inner.delete(R::TABLE, record.primary_key()).await
    }

    /// Delete a record if it still exists; `true` if this call removed it.
    pub async fn delete_if_exists<R: Record>(&self, record: &R) -> AppResult<bool> {
        self.inner
            .delete_if_exists(R::TABLE, record.primary_key())
            .await
    }

    /// Query a secondary index.
    pub async fn query<R: Record>(
        &self,
        index_name: &str,
        index_value: &str,
        consistency: ReadConsistency,
    ) -> AppResult<Vec<R>> {
        self.inner
            .query(R::TABLE, index_name, index_value, consistency)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Scan the record's table with a filter.
    pub async fn scan<R: Record>(&self, filter: &ScanFilter) -> AppResult<Vec<R>> {
        self.inner
            .scan(R::TABLE, filter)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Check that the store backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    /// Decode a raw record into its typed form.
    pub fn decode<R: Record>(raw: RawRecord) -> AppResult<R> {
        let RawRecord { key, document, .. } = raw;
        serde_json::from_value(document).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Failed to decode {} record '{key}': {e}", R::TABLE),
                e,
            )
        })
    }
}
