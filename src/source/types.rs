//! Entry type and the record source trait

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable audit record
///
/// Any extra JSON keys besides `id` and `timestamp` land in `fields` and are
/// addressable by filters and sorts through dotted paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique record id
    pub id: String,
    /// When the record was appended
    pub timestamp: DateTime<Utc>,
    /// Remaining named fields
    #[serde(flatten)]
    pub fields: JsonObject,
}

impl Entry {
    /// Create an entry with no extra fields
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            fields: JsonObject::new(),
        }
    }

    /// Add a named field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// The append-only store that yields the full, unpaginated dataset
///
/// Filtering and pagination happen entirely on the engine side of this call.
/// Errors returned here are propagated to the engine's caller unchanged.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every entry currently in the store
    async fn entries(&self) -> Result<Vec<Entry>>;
}
