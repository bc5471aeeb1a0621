//! Lenient timestamp fields.
//!
//! The panel usually sends RFC 3339 with an offset, but some records carry
//! a bare `YYYY-MM-DDTHH:MM:SS[.fff]` that is meant as UTC. Anything that is
//! neither becomes `None` for that one field instead of failing the record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Use as `#[serde(deserialize_with = "timestamp::lenient")]` on an
/// `Option<DateTime<Utc>>`.
pub(crate) fn lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => parse(&text),
        Value::Null => None,
        other => {
            tracing::debug!(value = %other, "ignoring non-string timestamp");
            None
        }
    })
}

pub(crate) fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    let parsed = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc());
    if parsed.is_none() && !text.is_empty() {
        tracing::debug!(value = text, "ignoring unparseable timestamp");
    }
    parsed
}
