//! Typed record contract used by the record mapper.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A document type persisted in one table of a [`KeyedRecordStore`].
///
/// [`KeyedRecordStore`]: crate::traits::KeyedRecordStore
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table the record lives in.
    const TABLE: &'static str;

    /// Primary key of this record.
    fn primary_key(&self) -> &str;
}
