//! Redis record store implementation.
//!
//! Layout (all keys carry the configured prefix):
//!
//! - `{table}:rec:{key}` holds the JSON-encoded [`RawRecord`]
//! - `{table}:keys` is the set of every primary key in the table
//! - `{table}:idx:{index}:{value}` is the set of keys reachable through one index value
//!
//! Writes that touch a record together with its sets run as Lua scripts,
//! so the sets always list exactly the indexes of the stored document.
//! A single Redis node serves every read from the primary, so both
//! [`ReadConsistency`] levels behave as consistent reads.

use std::sync::LazyLock;

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::{debug, warn};

use sessionkv_core::error::{AppError, ErrorKind};
use sessionkv_core::result::AppResult;
use sessionkv_core::traits::record_store::{
    KeyedRecordStore, RawRecord, ReadConsistency, ScanFilter,
};

use super::client::RedisClient;
use crate::keys;

/// Keys per `MGET` when fetching documents.
const MGET_BATCH_SIZE: usize = 500;

/// KEYS: record, table set, new index sets. ARGV: document, primary key,
/// index prefix. Drops the key from the previous document's index sets
/// before writing the new document and its sets.
static SAVE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local previous = redis.call('GET', KEYS[1])
        if previous then
            local indexes = cjson.decode(previous)['indexes']
            if type(indexes) == 'table' then
                for name, value in pairs(indexes) do
                    redis.call('SREM', ARGV[3] .. name .. ':' .. value, ARGV[2])
                end
            end
        end
        redis.call('SET', KEYS[1], ARGV[1])
        redis.call('SADD', KEYS[2], ARGV[2])
        for i = 3, #KEYS do
            redis.call('SADD', KEYS[i], ARGV[2])
        end
        return 1
        ",
    )
});

/// KEYS: record, table set. ARGV: primary key, index prefix.
/// Returns 1 only to the caller that removed the document.
static DELETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local previous = redis.call('GET', KEYS[1])
        redis.call('SREM', KEYS[2], ARGV[1])
        if not previous then
            return 0
        end
        local indexes = cjson.decode(previous)['indexes']
        if type(indexes) == 'table' then
            for name, value in pairs(indexes) do
                redis.call('SREM', ARGV[2] .. name .. ':' .. value, ARGV[1])
            end
        end
        redis.call('DEL', KEYS[1])
        return 1
        ",
    )
});

/// KEYS: index set. ARGV: record prefix, index name, index value, candidate
/// keys. Removes candidates whose document is gone or no longer carries
/// the index value, re-checked under the script's atomicity.
static PRUNE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        local removed = 0
        for i = 4, #ARGV do
            local document = redis.call('GET', ARGV[1] .. ARGV[i])
            local current = nil
            if document then
                local indexes = cjson.decode(document)['indexes']
                if type(indexes) == 'table' then
                    current = indexes[ARGV[2]]
                end
            end
            if current ~= ARGV[3] then
                removed = removed + redis.call('SREM', KEYS[1], ARGV[i])
            end
        end
        return removed
        ",
    )
});

/// Redis-backed record store.
#[derive(Debug, Clone)]
pub struct RedisRecordStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisRecordStore {
    /// Create a new Redis record store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }

    fn record_key(&self, table: &str, key: &str) -> String {
        self.client.prefixed_key(&keys::record(table, key))
    }

    fn members_key(&self, table: &str) -> String {
        self.client.prefixed_key(&keys::table_members(table))
    }

    fn index_key(&self, table: &str, index_name: &str, index_value: &str) -> String {
        self.client
            .prefixed_key(&keys::index_members(table, index_name, index_value))
    }

    /// Fetch the documents for a set of primary keys in `MGET` batches.
    /// A key whose record has disappeared pairs with `None`.
    async fn fetch(
        &self,
        table: &str,
        primary_keys: Vec<String>,
    ) -> AppResult<Vec<(String, Option<RawRecord>)>> {
        let mut entries = Vec::with_capacity(primary_keys.len());
        let mut conn = self.client.conn_mut();

        for batch in primary_keys.chunks(MGET_BATCH_SIZE) {
            let record_keys: Vec<String> = batch
                .iter()
                .map(|key| self.record_key(table, key))
                .collect();

            let documents: Vec<Option<String>> = redis::cmd("MGET")
                .arg(&record_keys)
                .query_async(&mut conn)
                .await
                .map_err(Self::map_err)?;

            for (key, json) in batch.iter().zip(documents) {
                let record = match json {
                    Some(json) => Some(serde_json::from_str::<RawRecord>(&json)?),
                    None => None,
                };
                entries.push((key.clone(), record));
            }
        }
        Ok(entries)
    }

    /// Drop index members that no longer point at a matching document.
    async fn prune_index(
        &self,
        table: &str,
        index_name: &str,
        index_value: &str,
        candidates: &[String],
    ) -> AppResult<i64> {
        let mut invocation = PRUNE_SCRIPT.prepare_invoke();
        invocation
            .key(self.index_key(table, index_name, index_value))
            .arg(self.client.prefixed_key(&keys::record_prefix(table)))
            .arg(index_name)
            .arg(index_value);
        for key in candidates {
            invocation.arg(key);
        }

        let mut conn = self.client.conn_mut();
        let removed: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(removed)
    }
}

#[async_trait]
impl KeyedRecordStore for RedisRecordStore {
    async fn load(
        &self,
        table: &str,
        key: &str,
        _consistency: ReadConsistency,
    ) -> AppResult<Option<RawRecord>> {
        let mut conn = self.client.conn_mut();
        let json: Option<String> = conn
            .get(self.record_key(table, key))
            .await
            .map_err(Self::map_err)?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, table: &str, record: RawRecord) -> AppResult<()> {
        let json = serde_json::to_string(&record)?;

        let mut invocation = SAVE_SCRIPT.prepare_invoke();
        invocation
            .key(self.record_key(table, &record.key))
            .key(self.members_key(table));
        for (index_name, index_value) in &record.indexes {
            invocation.key(self.index_key(table, index_name, index_value));
        }
        invocation
            .arg(json)
            .arg(&record.key)
            .arg(self.client.prefixed_key(&keys::index_prefix(table)));

        let mut conn = self.client.conn_mut();
        let _: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(table, key = %record.key, "Saved record");
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> AppResult<()> {
        self.delete_if_exists(table, key).await?;
        Ok(())
    }

    async fn delete_if_exists(&self, table: &str, key: &str) -> AppResult<bool> {
        let mut invocation = DELETE_SCRIPT.prepare_invoke();
        invocation
            .key(self.record_key(table, key))
            .key(self.members_key(table))
            .arg(key)
            .arg(self.client.prefixed_key(&keys::index_prefix(table)));

        let mut conn = self.client.conn_mut();
        let removed: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(table, key, removed, "Deleted record");
        Ok(removed > 0)
    }

    async fn query(
        &self,
        table: &str,
        index_name: &str,
        index_value: &str,
        _consistency: ReadConsistency,
    ) -> AppResult<Vec<RawRecord>> {
        let mut conn = self.client.conn_mut();
        let members: Vec<String> = conn
            .smembers(self.index_key(table, index_name, index_value))
            .await
            .map_err(Self::map_err)?;

        let mut matched = Vec::new();
        let mut stale = Vec::new();
        for (key, record) in self.fetch(table, members).await? {
            match record {
                Some(record)
                    if record
                        .indexes
                        .get(index_name)
                        .is_some_and(|value| value == index_value) =>
                {
                    matched.push(record);
                }
                _ => stale.push(key),
            }
        }

        if !stale.is_empty() {
            match self
                .prune_index(table, index_name, index_value, &stale)
                .await
            {
                Ok(removed) => debug!(table, index_name, removed, "Pruned stale index members"),
                Err(e) => warn!(table, index_name, error = %e, "Failed to prune index members"),
            }
        }

        Ok(matched)
    }

    async fn scan(&self, table: &str, filter: &ScanFilter) -> AppResult<Vec<RawRecord>> {
        let mut conn = self.client.conn_mut();
        let members: Vec<String> = conn
            .smembers(self.members_key(table))
            .await
            .map_err(Self::map_err)?;

        let scanned = members.len();
        let matched: Vec<RawRecord> = self
            .fetch(table, members)
            .await?
            .into_iter()
            .filter_map(|(_, record)| record)
            .filter(|record| filter.matches(&record.document))
            .collect();

        debug!(table, scanned, matched = matched.len(), "Scanned table");
        Ok(matched)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

/// These tests need a running Redis server and are skipped unless
/// `REDIS_URL` is set. Each test works under its own key prefix.
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sessionkv_core::config::store::RedisStoreConfig;

    async fn redis_store() -> Option<RedisRecordStore> {
        let Ok(url) = std::env::var("REDIS_URL") else {
            eprintln!("REDIS_URL not set, skipping Redis test");
            return None;
        };
        let config = RedisStoreConfig {
            url,
            key_prefix: format!("sessionkv-test:{}:", uuid::Uuid::new_v4()),
        };
        let client = RedisClient::connect(&config)
            .await
            .expect("Failed to connect to Redis");
        Some(RedisRecordStore::new(client))
    }

    fn record(key: &str, owner: &str, deadline: Option<i64>) -> RawRecord {
        RawRecord::new(key, json!({"key": key, "expires_at": deadline})).with_index("owner", owner)
    }

    async fn index_set(store: &RedisRecordStore, owner: &str) -> Vec<String> {
        let mut conn = store.client.conn_mut();
        let mut members: Vec<String> = conn
            .smembers(store.index_key("t", "owner", owner))
            .await
            .unwrap();
        members.sort();
        members
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let Some(store) = redis_store().await else {
            return;
        };
        store.save("t", record("a", "alice", Some(10))).await.unwrap();
        let loaded = store
            .load("t", "a", ReadConsistency::Consistent)
            .await
            .unwrap();
        assert_eq!(loaded, Some(record("a", "alice", Some(10))));
        assert!(store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_resave_moves_index_membership() {
        let Some(store) = redis_store().await else {
            return;
        };
        store.save("t", record("a", "alice", None)).await.unwrap();
        store.save("t", record("a", "bob", None)).await.unwrap();

        assert!(index_set(&store, "alice").await.is_empty());
        assert_eq!(index_set(&store, "bob").await, vec!["a".to_string()]);

        let alice = store
            .query("t", "owner", "alice", ReadConsistency::Consistent)
            .await
            .unwrap();
        assert!(alice.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_leave_one_index_entry() {
        let Some(store) = redis_store().await else {
            return;
        };
        let owners: Vec<String> = (0..8).map(|i| format!("owner-{i}")).collect();
        let mut handles = Vec::new();
        for owner in owners.clone() {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.save("t", record("a", &owner, None)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut listed = 0;
        for owner in &owners {
            listed += index_set(&store, owner).await.len();
        }
        assert_eq!(listed, 1);
    }

    #[tokio::test]
    async fn test_delete_if_exists_reports_winner_once() {
        let Some(store) = redis_store().await else {
            return;
        };
        store.save("t", record("a", "alice", None)).await.unwrap();
        assert!(store.delete_if_exists("t", "a").await.unwrap());
        assert!(!store.delete_if_exists("t", "a").await.unwrap());

        assert!(index_set(&store, "alice").await.is_empty());
        let all = store.scan("t", &ScanFilter::All).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_delete_has_single_winner() {
        let Some(store) = redis_store().await else {
            return;
        };
        store.save("t", record("a", "alice", None)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.delete_if_exists("t", "a").await
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_query_prunes_stale_members() {
        let Some(store) = redis_store().await else {
            return;
        };
        store.save("t", record("a", "alice", None)).await.unwrap();
        store.save("t", record("b", "bob", None)).await.unwrap();

        let mut conn = store.client.conn_mut();
        let _: i64 = conn
            .sadd(store.index_key("t", "owner", "alice"), vec!["b", "ghost"])
            .await
            .unwrap();

        let found = store
            .query("t", "owner", "alice", ReadConsistency::Consistent)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "a");
        assert_eq!(index_set(&store, "alice").await, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_scan_spans_several_batches() {
        let Some(store) = redis_store().await else {
            return;
        };
        let total = MGET_BATCH_SIZE * 2 + 7;
        for i in 0..total {
            let deadline = if i % 2 == 0 { Some(1) } else { Some(100) };
            store
                .save("t", record(&format!("k{i}"), "x", deadline))
                .await
                .unwrap();
        }

        let all = store.scan("t", &ScanFilter::All).await.unwrap();
        assert_eq!(all.len(), total);

        let filter = ScanFilter::AtMost {
            field: "expires_at".to_string(),
            bound: 10,
        };
        let due = store.scan("t", &filter).await.unwrap();
        assert_eq!(due.len(), total.div_ceil(2));
    }
}
