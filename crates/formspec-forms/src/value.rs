//! Converted form values.
//!
//! A [`FormValue`] is what a field type's converter produces from the raw
//! form string, what validators inspect, and what the decode engine
//! finally transfers into the caller's record.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use serde::Serialize;

/// A typed value converted from raw form input.
///
/// Serializes untagged, so a value lands in a record field of the matching
/// Rust type (`bool`, `i32`, `i64`, `f64`, `String`,
/// `chrono::DateTime<FixedOffset>`, or anything deserializable from JSON).
///
/// # Examples
///
/// ```
/// use formspec_forms::value::FormValue;
///
/// let v = FormValue::from(23);
/// assert_eq!(v.as_i64(), Some(23));
/// assert_eq!(serde_json::to_value(&v).unwrap(), serde_json::json!(23));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// A boolean.
    Bool(bool),
    /// An integer within the 32-bit range.
    Int(i32),
    /// A 64-bit integer.
    Int64(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    String(String),
    /// A date or date-time at the configured offset.
    DateTime(DateTime<FixedOffset>),
    /// Arbitrary JSON, produced by custom converters.
    Json(serde_json::Value),
}

impl FormValue {
    /// The zero value for date types: `0001-01-01T00:00:00+00:00`.
    pub fn zero_date_time() -> DateTime<FixedOffset> {
        let naive = NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Utc.fix().from_utc_datetime(&naive)
    }

    /// Returns the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer widened to 64 bits, for either integer width.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i64::from(*i)),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, if this is a float value.
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the date-time, if this is a date value.
    pub const fn as_date_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns a short name for the variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Int64(_) => "int64",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Json(_) => "json",
        }
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Int64(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Json(j) => write!(f, "{j}"),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for FormValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FormValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for FormValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for FormValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FormValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FormValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<DateTime<FixedOffset>> for FormValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::DateTime(v)
    }
}

impl From<serde_json::Value> for FormValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}
