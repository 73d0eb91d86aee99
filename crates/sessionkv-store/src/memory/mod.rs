//! In-process record store.

pub mod store;

pub use store::MemoryRecordStore;
