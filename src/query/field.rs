//! Dotted-path field accessor

use crate::source::Entry;
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A value looked up on an entry
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// The entry id
    Text(&'a str),
    /// The entry timestamp
    Time(DateTime<Utc>),
    /// Any value inside the entry's free-form fields
    Json(&'a JsonValue),
}

/// Look up a field by dotted path (`actor.name`, `changes.0.field`)
///
/// `id` and `timestamp` resolve to the entry's typed fields. Numeric segments
/// index into arrays.
pub fn lookup<'a>(entry: &'a Entry, path: &str) -> Option<FieldValue<'a>> {
    match path {
        "id" => Some(FieldValue::Text(&entry.id)),
        "timestamp" => Some(FieldValue::Time(entry.timestamp)),
        _ => {
            let mut parts = path.split('.');
            let mut current = entry.fields.get(parts.next()?)?;
            for part in parts {
                current = match current {
                    JsonValue::Object(map) => map.get(part)?,
                    JsonValue::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                    _ => return None,
                };
            }
            Some(FieldValue::Json(current))
        }
    }
}

impl FieldValue<'_> {
    /// Convert to an owned JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String((*s).to_string()),
            FieldValue::Time(t) => JsonValue::String(t.to_rfc3339()),
            FieldValue::Json(v) => (*v).clone(),
        }
    }

    /// Check equality against a filter value
    pub fn matches(&self, expected: &JsonValue) -> bool {
        match (self, expected) {
            (FieldValue::Text(s), JsonValue::String(e)) => *s == e.as_str(),
            (FieldValue::Time(t), JsonValue::String(e)) => {
                parse_time(e).is_some_and(|parsed| parsed == *t)
            }
            (FieldValue::Time(t), JsonValue::Number(n)) => {
                n.as_i64() == Some(t.timestamp_millis())
            }
            (FieldValue::Json(JsonValue::Number(a)), JsonValue::Number(b)) => {
                a == b || a.as_f64() == b.as_f64()
            }
            (FieldValue::Json(v), e) => *v == e,
            _ => false,
        }
    }

    /// Type rank used to order values of different kinds
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Json(JsonValue::Null) => 0,
            FieldValue::Json(JsonValue::Bool(_)) => 1,
            FieldValue::Json(JsonValue::Number(_)) => 2,
            FieldValue::Text(_) | FieldValue::Time(_) | FieldValue::Json(JsonValue::String(_)) => {
                3
            }
            FieldValue::Json(_) => 4,
        }
    }

    /// Total order over field values
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }

        match (self, other) {
            (FieldValue::Json(JsonValue::Bool(a)), FieldValue::Json(JsonValue::Bool(b))) => {
                a.cmp(b)
            }
            (FieldValue::Json(JsonValue::Number(a)), FieldValue::Json(JsonValue::Number(b))) => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.total_cmp(&b)
            }
            (FieldValue::Time(a), FieldValue::Time(b)) => a.cmp(b),
            (FieldValue::Time(a), other) => match other.as_str().and_then(parse_time) {
                Some(b) => a.cmp(&b),
                None => a.to_rfc3339().as_str().cmp(other.as_str().unwrap_or_default()),
            },
            (_, FieldValue::Time(_)) => other.compare(self).reverse(),
            (a, b) => match (a.as_str(), b.as_str()) {
                (Some(a), Some(b)) => a.cmp(b),
                _ => a.to_json().to_string().cmp(&b.to_json().to_string()),
            },
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Json(JsonValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Parse an RFC 3339 timestamp or integer epoch milliseconds
pub(crate) fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}
