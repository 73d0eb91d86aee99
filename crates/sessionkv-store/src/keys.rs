//! Redis key builders for record store tables.
//!
//! Centralising key construction keeps the on-disk layout in one place.
//! Keys returned here are not yet prefixed; the Redis client applies the
//! configured prefix.

/// Common prefix of every record key in a table.
pub fn record_prefix(table: &str) -> String {
    format!("{table}:rec:")
}

/// Key holding the JSON document of one record.
pub fn record(table: &str, key: &str) -> String {
    format!("{}{key}", record_prefix(table))
}

/// Key of the set listing every primary key in a table.
pub fn table_members(table: &str) -> String {
    format!("{table}:keys")
}

/// Common prefix of every index set in a table.
pub fn index_prefix(table: &str) -> String {
    format!("{table}:idx:")
}

/// Key of the set listing the primary keys reachable through one index value.
pub fn index_members(table: &str, index_name: &str, index_value: &str) -> String {
    format!("{}{index_name}:{index_value}", index_prefix(table))
}
