//! In-memory session handle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use sessionkv_core::result::AppResult;
use sessionkv_entity::session::SessionRecord;

/// A session as handed to callers.
///
/// Wraps the persisted [`SessionRecord`] together with the transient
/// `is_new` and `changed` flags, which never reach the store. Instances
/// are produced by the repository and owned by whoever obtained them.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Persisted state.
    record: SessionRecord,
    /// True until the first successful save.
    is_new: bool,
    /// Set by any mutation since the last save.
    changed: bool,
}

impl Session {
    /// A brand-new, unsaved session.
    pub(crate) fn new(id: String, now: DateTime<Utc>, max_inactive_interval_seconds: i64) -> Self {
        Self {
            record: SessionRecord::new(id, now, max_inactive_interval_seconds),
            is_new: true,
            changed: false,
        }
    }

    /// A session loaded from the store.
    pub(crate) fn from_stored(record: SessionRecord) -> Self {
        Self {
            record,
            is_new: false,
            changed: false,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// When the session was created.
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.record.creation_time
    }

    /// Last explicit access.
    pub fn last_accessed_time(&self) -> DateTime<Utc> {
        self.record.last_accessed_time
    }

    /// Record an access at `time`.
    ///
    /// Times are kept to millisecond precision and never precede the
    /// creation time.
    pub fn set_last_accessed_time(&mut self, time: DateTime<Utc>) {
        self.record.set_last_accessed_time(time);
        self.changed = true;
    }

    /// Record an access now.
    pub fn touch(&mut self) {
        self.set_last_accessed_time(Utc::now());
    }

    /// Inactivity interval in seconds; negative means never expires.
    pub fn max_inactive_interval_seconds(&self) -> i64 {
        self.record.max_inactive_interval_seconds
    }

    /// Change the inactivity interval.
    pub fn set_max_inactive_interval_seconds(&mut self, seconds: i64) {
        self.record.max_inactive_interval_seconds = seconds;
        self.record.refresh_expiry();
        self.changed = true;
    }

    /// Instant at which the session expires, if it ever does.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.record.expires_at
    }

    /// Whether the session is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the session is expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.record.is_expired_at(now)
    }

    /// Raw attribute value.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.record.attributes.get(name)
    }

    /// Attribute value decoded into `T`.
    ///
    /// Returns `Ok(None)` when the attribute is absent and a
    /// serialization error when it does not have the expected shape.
    pub fn attribute_as<T: DeserializeOwned>(&self, name: &str) -> AppResult<Option<T>> {
        match self.record.attributes.get(name) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Set an attribute. Setting `null` removes it.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        if value.is_null() {
            self.record.attributes.remove(&name);
        } else {
            self.record.attributes.insert(name, value);
        }
        self.changed = true;
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        let previous = self.record.attributes.remove(name);
        if previous.is_some() {
            self.changed = true;
        }
        previous
    }

    /// Names of every attribute, in no particular order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.record.attributes.keys().map(String::as_str)
    }

    /// All attributes.
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.record.attributes
    }

    /// Whether the session has never been saved.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether the session was mutated since it was created, loaded or saved.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// The persisted form of this session.
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Clear the transient flags after a successful save.
    pub(crate) fn mark_saved(&mut self) {
        self.is_new = false;
        self.changed = false;
    }
}
