use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a catalog record.
///
/// The text index and the record store agree on this value; nothing else about its
/// shape is assumed here. The Postgres backend additionally requires it to be a UUID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Canonical representation of a catalog item as owned by the record store.
///
/// `attributes` is the schema-less product payload (price, images, specs, ...)
/// exactly as it was ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "dataRow", alias = "attributes", default)]
    pub attributes: serde_json::Value,
}

/// Failures of a record store lookup.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store answered, and the record does not exist.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The store could not be reached or answered with something unusable.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
