//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs are deliberately lenient: a field holding anything other than
//! a JSON string is read as absent, so the handler rejects it with the same
//! message as a missing value instead of a deserialization error.

pub mod download;
pub mod feed;
pub mod health;
pub mod subscribe;

use serde::{Deserialize, Deserializer};

/// Deserializes an optional string field, mapping non-string values to `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}
