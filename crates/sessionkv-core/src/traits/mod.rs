//! Core traits defined in `sessionkv-core` and implemented by other crates.

pub mod record;
pub mod record_store;

pub use record::Record;
pub use record_store::{KeyedRecordStore, RawRecord, ReadConsistency, ScanFilter};
