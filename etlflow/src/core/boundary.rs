//! Boundary values and steps for windowed iteration.
//!
//! Bounds are spliced into textual payloads, so each kind renders to a
//! locale-free literal: integers as plain digits, dates as `YYYY-MM-DD`,
//! datetimes as `YYYY-MM-DD HH:MM:SS` and opaque values unchanged.

use crate::core::Value;
use crate::errors::{ConfigurationError, EtlResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Render format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Render format for datetimes.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SECONDS_PER_DAY: i64 = 86_400;

/// A value a window can start or end at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BoundaryValue {
    /// A whole number, typically an identifier.
    Integer(i64),
    /// A calendar date.
    Date(NaiveDate),
    /// A date and wall-clock time without zone.
    DateTime(NaiveDateTime),
    /// Anything else, rendered as-is.
    Opaque(String),
}

impl BoundaryValue {
    /// Parses a literal the way it would be rendered.
    ///
    /// Tries datetime, then date, then integer; falls back to `Opaque`.
    #[must_use]
    pub fn parse_literal(literal: &str) -> Self {
        let trimmed = literal.trim();
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT) {
            return Self::DateTime(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Self::Date(d);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        Self::Opaque(literal.to_string())
    }

    /// Short name of the value's kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Renders the canonical literal form for embedding into a payload.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Integer(i) => i.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Self::Opaque(s) => s.clone(),
        }
    }

    /// Returns the value advanced by one step.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the step cannot be applied to
    /// this kind of value, or when the result overflows.
    pub fn advance(&self, step: &Step) -> EtlResult<Self> {
        let mismatch = || ConfigurationError::bound_mismatch("advance", self.kind(), step.kind());

        let next = match (self, step) {
            (Self::Integer(i), Step::Integer(n)) => i.checked_add(*n).map(Self::Integer),
            (Self::Date(d), Step::Integer(days)) => TimeDelta::try_days(*days)
                .and_then(|delta| d.checked_add_signed(delta))
                .map(Self::Date),
            (Self::Date(d), Step::Duration(delta)) => {
                if !is_whole_days(*delta) {
                    return Err(mismatch().into());
                }
                d.checked_add_signed(*delta).map(Self::Date)
            }
            (Self::DateTime(dt), Step::Integer(secs)) => TimeDelta::try_seconds(*secs)
                .and_then(|delta| dt.checked_add_signed(delta))
                .map(Self::DateTime),
            (Self::DateTime(dt), Step::Duration(delta)) => {
                dt.checked_add_signed(*delta).map(Self::DateTime)
            }
            _ => None,
        };

        next.ok_or_else(|| mismatch().into())
    }

    /// Compares two bounds of compatible kinds.
    ///
    /// A date compares against a datetime as midnight of that date.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for incompatible kinds.
    pub fn compare(&self, other: &Self) -> EtlResult<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Ok(a.cmp(b)),
            (Self::Date(a), Self::DateTime(b)) => Ok(a.and_time(NaiveTime::MIN).cmp(b)),
            (Self::DateTime(a), Self::Date(b)) => Ok(a.cmp(&b.and_time(NaiveTime::MIN))),
            (Self::Opaque(a), Self::Opaque(b)) => Ok(a.cmp(b)),
            _ => Err(ConfigurationError::bound_mismatch("compare", self.kind(), other.kind()).into()),
        }
    }

    /// Returns true when `self >= other`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for incompatible kinds.
    pub fn is_at_or_after(&self, other: &Self) -> EtlResult<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    /// Converts into a store value for parameter binding.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Integer(i) => Value::Integer(*i),
            Self::Date(d) => Value::Date(*d),
            Self::DateTime(dt) => Value::DateTime(*dt),
            Self::Opaque(s) => Value::Text(s.clone()),
        }
    }
}

impl fmt::Display for BoundaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<i64> for BoundaryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for BoundaryValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<NaiveDate> for BoundaryValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for BoundaryValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<&str> for BoundaryValue {
    fn from(value: &str) -> Self {
        Self::Opaque(value.to_string())
    }
}

impl From<String> for BoundaryValue {
    fn from(value: String) -> Self {
        Self::Opaque(value)
    }
}

/// The distance between consecutive window bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// A plain count: units for integers, days for dates, seconds for datetimes.
    Integer(i64),
    /// A span of time.
    Duration(TimeDelta),
}

impl Step {
    /// A step of whole days.
    ///
    /// # Panics
    ///
    /// Panics if the number of days is out of range for a `TimeDelta`.
    #[must_use]
    pub fn days(days: i64) -> Self {
        Self::Duration(TimeDelta::days(days))
    }

    /// A step of whole hours.
    #[must_use]
    pub fn hours(hours: i64) -> Self {
        Self::Duration(TimeDelta::hours(hours))
    }

    /// A step of whole minutes.
    #[must_use]
    pub fn minutes(minutes: i64) -> Self {
        Self::Duration(TimeDelta::minutes(minutes))
    }

    /// A step of whole seconds.
    #[must_use]
    pub fn seconds(seconds: i64) -> Self {
        Self::Duration(TimeDelta::seconds(seconds))
    }

    /// Short name of the step's kind, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer step",
            Self::Duration(_) => "duration step",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Duration(d) => write!(f, "{}s", d.num_seconds()),
        }
    }
}

impl From<i64> for Step {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Step {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<TimeDelta> for Step {
    fn from(value: TimeDelta) -> Self {
        Self::Duration(value)
    }
}

fn is_whole_days(delta: TimeDelta) -> bool {
    delta.subsec_nanos() == 0 && delta.num_seconds() % SECONDS_PER_DAY == 0
}
