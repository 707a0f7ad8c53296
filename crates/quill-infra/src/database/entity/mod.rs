//! SeaORM entities backing the PostgreSQL stores.

pub mod category;
pub mod post;
pub mod user;

use serde::de::DeserializeOwned;

use quill_core::error::RepoError;

/// Decode a JSONB column. Malformed data is an error, never an empty default.
pub(crate) fn decode_json<T>(
    value: serde_json::Value,
    column: &'static str,
) -> Result<T, RepoError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value)
        .map_err(|e| RepoError::Query(format!("Malformed JSON in {}: {}", column, e)))
}

/// Counters are stored as BIGINT; negative values read back as zero.
pub(crate) fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

pub(crate) fn from_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
