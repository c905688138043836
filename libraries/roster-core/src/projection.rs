//! Output projection
//!
//! Turns users into JSON objects holding only the selected fields, in the
//! order they were selected. Timestamps are rendered in a fixed display
//! offset.

use crate::field::{FieldValue, UserField};
use crate::types::User;
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

/// Offset east of UTC used by the default display zone (UTC+07:00)
const DEFAULT_OFFSET_SECS: i32 = 7 * 3600;

/// Error returned for a malformed UTC offset
#[derive(Debug, Error)]
#[error("invalid UTC offset: {0}")]
pub struct InvalidOffset(pub String);

/// Fixed time zone in which timestamps are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(FixedOffset);

impl DisplayZone {
    pub fn new(offset: FixedOffset) -> Self {
        Self(offset)
    }

    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    pub fn offset(self) -> FixedOffset {
        self.0
    }

    /// Render a timestamp as RFC 3339 in this zone
    pub fn format(self, ts: DateTime<Utc>) -> String {
        ts.with_timezone(&self.0)
            .to_rfc3339_opts(SecondsFormat::Millis, false)
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self(FixedOffset::east_opt(DEFAULT_OFFSET_SECS).unwrap_or(Utc.fix()))
    }
}

impl FromStr for DisplayZone {
    type Err = InvalidOffset;

    /// Accepts `Z`, `UTC`, `+HH:MM`, `-HH:MM` and `+HHMM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let invalid = || InvalidOffset(s.to_string());
        let (sign, rest) = if let Some(rest) = raw.strip_prefix('+') {
            (1, rest)
        } else if let Some(rest) = raw.strip_prefix('-') {
            (-1, rest)
        } else {
            return Err(invalid());
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// JSON value of one field
pub fn field_json(field: UserField, user: &User, zone: DisplayZone) -> Value {
    match field.value(user) {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Text(text) => Value::from(text),
        FieldValue::Timestamp(ts) => Value::from(zone.format(ts)),
    }
}

/// Project a user onto `fields`; an empty selection means every field
pub fn project(user: &User, fields: &[UserField], zone: DisplayZone) -> Map<String, Value> {
    let fields: &[UserField] = if fields.is_empty() {
        &UserField::ALL
    } else {
        fields
    };

    fields
        .iter()
        .map(|field| (field.name().to_string(), field_json(*field, user, zone)))
        .collect()
}
