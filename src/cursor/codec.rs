//! Cursor encoding and decoding

use crate::error::{Error, Result};
use crate::query::lookup;
use crate::source::Entry;
use crate::types::{Direction, JsonValue};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decoded position inside an ordered entry sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationCursor {
    /// Id of the entry the cursor points at
    pub id: String,
    /// Timestamp of that entry
    pub timestamp: DateTime<Utc>,
    /// Value of the active sort field on that entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_value: Option<JsonValue>,
    /// Direction the cursor continues in
    pub direction: Direction,
}

impl PaginationCursor {
    /// Build a cursor pointing at an entry
    pub fn from_entry(entry: &Entry, direction: Direction, sort_by: Option<&str>) -> Self {
        Self {
            id: entry.id.clone(),
            timestamp: entry.timestamp,
            sort_value: sort_by
                .and_then(|field| lookup(entry, field))
                .map(|value| value.to_json()),
            direction,
        }
    }
}

/// Encoder / decoder for opaque cursor tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorCodec;

impl CursorCodec {
    /// Encode a cursor pointing at `entry`
    pub fn encode(entry: &Entry, direction: Direction, sort_by: Option<&str>) -> String {
        Self::encode_cursor(&PaginationCursor::from_entry(entry, direction, sort_by))
    }

    /// Encode an already-built cursor
    pub fn encode_cursor(cursor: &PaginationCursor) -> String {
        // Serializing a struct of strings, a timestamp and a JSON value cannot fail
        let json = serde_json::to_vec(cursor).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token back into a cursor
    pub fn decode(token: &str) -> Result<PaginationCursor> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| Error::malformed_cursor(format!("invalid base64: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| Error::malformed_cursor(format!("invalid cursor payload: {e}")))
    }
}
