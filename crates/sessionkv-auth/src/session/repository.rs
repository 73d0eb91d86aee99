//! Session persistence: create, save, load with expiry, delete and
//! principal-name lookup.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use sessionkv_core::config::session::SessionConfig;
use sessionkv_core::result::AppResult;
use sessionkv_core::traits::ReadConsistency;
use sessionkv_entity::session::{DEFAULT_MAX_INACTIVE_INTERVAL_SECONDS, SessionRecord};
use sessionkv_store::RecordMapper;

use super::resolver::{
    PRINCIPAL_NAME_INDEX_NAME, PrincipalNameResolver, SecurityContextPrincipalResolver,
};
use super::state::Session;

/// Default bound on concurrent deletions during one sweep pass.
const DEFAULT_MAX_CONCURRENT_DELETES: usize = 16;

/// Owns the session lifecycle against the keyed record store.
///
/// Holds no session state of its own; every call goes to the store.
#[derive(Clone)]
pub struct SessionRepository {
    /// Typed record store.
    pub(crate) mapper: Arc<RecordMapper>,
    /// Resolves the principal-name index value at save time.
    resolver: Arc<dyn PrincipalNameResolver>,
    /// Interval given to newly created sessions.
    default_max_inactive_interval_seconds: i64,
    /// Upper bound on deletions in flight during a sweep.
    pub(crate) max_concurrent_deletes: usize,
}

impl std::fmt::Debug for SessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRepository")
            .field(
                "default_max_inactive_interval_seconds",
                &self.default_max_inactive_interval_seconds,
            )
            .field("max_concurrent_deletes", &self.max_concurrent_deletes)
            .finish()
    }
}

impl SessionRepository {
    /// Creates a repository with the library defaults.
    pub fn new(mapper: Arc<RecordMapper>) -> Self {
        Self {
            mapper,
            resolver: Arc::new(SecurityContextPrincipalResolver),
            default_max_inactive_interval_seconds: DEFAULT_MAX_INACTIVE_INTERVAL_SECONDS,
            max_concurrent_deletes: DEFAULT_MAX_CONCURRENT_DELETES,
        }
    }

    /// Creates a repository from the session configuration.
    pub fn from_config(mapper: Arc<RecordMapper>, config: &SessionConfig) -> Self {
        Self::new(mapper)
            .with_default_max_inactive_interval(config.default_max_inactive_interval_seconds)
            .with_max_concurrent_deletes(config.cleanup.max_concurrent_deletes)
    }

    /// Sets the inactivity interval given to new sessions.
    pub fn with_default_max_inactive_interval(mut self, seconds: i64) -> Self {
        self.default_max_inactive_interval_seconds = seconds;
        self
    }

    /// Replaces the principal name resolver.
    pub fn with_principal_resolver(mut self, resolver: impl PrincipalNameResolver) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Sets the sweep's concurrent deletion bound (at least one).
    pub fn with_max_concurrent_deletes(mut self, limit: usize) -> Self {
        self.max_concurrent_deletes = limit.max(1);
        self
    }

    /// Interval given to new sessions.
    pub fn default_max_inactive_interval_seconds(&self) -> i64 {
        self.default_max_inactive_interval_seconds
    }

    /// Builds a new, unsaved session. No I/O.
    pub fn create_session(&self) -> Session {
        self.create_session_at(Utc::now())
    }

    /// Builds a new, unsaved session created at `now`.
    pub fn create_session_at(&self, now: DateTime<Utc>) -> Session {
        Session::new(
            Uuid::new_v4().to_string(),
            now,
            self.default_max_inactive_interval_seconds,
        )
    }

    /// Persists the full state of a session.
    ///
    /// A session that was saved before is deleted and re-inserted so that
    /// its principal index entry always matches its attributes.
    pub async fn save(&self, session: &mut Session) -> AppResult<()> {
        let principal = self.resolver.resolve(session.attributes());

        if !session.is_new() {
            self.mapper.delete(session.record()).await?;
        }

        let indexes = principal.map(|name| (PRINCIPAL_NAME_INDEX_NAME.to_string(), name));
        self.mapper.save_indexed(session.record(), indexes).await?;
        session.mark_saved();

        debug!(session_id = %session.id(), "Saved session");
        Ok(())
    }

    /// Loads a live session.
    ///
    /// An expired session is deleted and reported as absent.
    pub async fn get_session(&self, id: &str) -> AppResult<Option<Session>> {
        self.get_session_at(id, Utc::now()).await
    }

    /// Loads a session, evaluating expiry as of `now`.
    pub async fn get_session_at(&self, id: &str, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        let Some(record) = self
            .mapper
            .load::<SessionRecord>(id, ReadConsistency::Consistent)
            .await?
        else {
            return Ok(None);
        };

        if record.is_expired_at(now) {
            info!(session_id = %id, "Removing expired session on access");
            self.mapper.delete(&record).await?;
            return Ok(None);
        }

        Ok(Some(Session::from_stored(record)))
    }

    /// Deletes a session. Deleting an unknown id is not an error.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.mapper.delete(&SessionRecord::placeholder(id)).await?;
        debug!(session_id = %id, "Deleted session");
        Ok(())
    }

    /// Looks sessions up through a secondary index.
    ///
    /// Only [`PRINCIPAL_NAME_INDEX_NAME`] is supported; any other index
    /// name yields an empty result. Expired sessions are left out.
    pub async fn find_by_index_name_and_index_value(
        &self,
        index_name: &str,
        index_value: &str,
    ) -> AppResult<HashMap<String, Session>> {
        if index_name != PRINCIPAL_NAME_INDEX_NAME {
            debug!(index_name, "Unsupported session index requested");
            return Ok(HashMap::new());
        }

        let now = Utc::now();
        let records: Vec<SessionRecord> = self
            .mapper
            .query(index_name, index_value, ReadConsistency::Consistent)
            .await?;

        Ok(records
            .into_iter()
            .filter(|record| !record.is_expired_at(now))
            .map(|record| (record.id.clone(), Session::from_stored(record)))
            .collect())
    }

    /// Sessions indexed under a principal name, keyed by session id.
    pub async fn find_by_principal_name(
        &self,
        principal_name: &str,
    ) -> AppResult<HashMap<String, Session>> {
        self.find_by_index_name_and_index_value(PRINCIPAL_NAME_INDEX_NAME, principal_name)
            .await
    }
}
