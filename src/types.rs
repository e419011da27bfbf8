//! Common types used throughout trailpager
//!
//! This module contains shared type definitions, type aliases,
//! and the small enums every other module speaks in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Filter set keyed by (possibly dotted) field path.
///
/// Ordered so that serialization, and therefore cache keys, are deterministic.
pub type FilterMap = BTreeMap<String, JsonValue>;

// ============================================================================
// Pagination Strategy
// ============================================================================

/// Pagination algorithm used to turn a request into a page
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Page number / offset + limit
    #[default]
    Offset,
    /// Opaque continuation token
    Cursor,
    /// Resume relative to a timestamp (newest first)
    #[serde(alias = "time_based")]
    #[value(alias = "time-based")]
    Time,
    /// Resume relative to an entry id (ascending ids)
    #[serde(alias = "id_based")]
    #[value(alias = "id-based")]
    Id,
}

impl Strategy {
    /// All strategies, in declaration order
    pub const ALL: [Strategy; 4] = [
        Strategy::Offset,
        Strategy::Cursor,
        Strategy::Time,
        Strategy::Id,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Offset => "offset",
            Strategy::Cursor => "cursor",
            Strategy::Time => "time",
            Strategy::Id => "id",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "offset" | "page" => Ok(Strategy::Offset),
            "cursor" => Ok(Strategy::Cursor),
            "time" | "time_based" | "timestamp" => Ok(Strategy::Time),
            "id" | "id_based" => Ok(Strategy::Id),
            other => Err(crate::error::Error::invalid_value(
                "strategy",
                format!("unknown pagination strategy '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Directions
// ============================================================================

/// Direction of travel through the ordered set
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards the end of the set
    #[default]
    Forward,
    /// Towards the start of the set
    Backward,
}

impl Direction {
    /// Check if this is the forward direction
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward)
    }
}

/// Sort order for a field
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first (newest first for timestamps)
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}
