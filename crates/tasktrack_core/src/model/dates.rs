//! Due dates, timestamps and user date input.
//!
//! # Responsibility
//! - Model "no due date" as an explicit `Due::Never` instead of a far-future
//!   magic date.
//! - Parse user date input (`YYYY-MM-DD`, `MM-DD`, `never`).
//! - Provide the stable text formats used by persistence.
//!
//! # Invariants
//! - `Due::Never` orders after every `Due::On(_)`.
//! - `MM-DD` input never resolves to a date before `today`.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Persisted and displayed calendar date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Persisted timestamp format for `created`/`completed`/`deleted`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Text token for an unbounded due date.
pub const NEVER: &str = "never";

/// Due date of a task or project.
///
/// Variant order matters: the derived `Ord` makes `Never` the greatest value,
/// so `min()` over due dates picks the closest real deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Due {
    On(NaiveDate),
    Never,
}

impl Due {
    /// Whole days from `today` until the due date; `+inf` for `Never`.
    pub fn days_from(self, today: NaiveDate) -> f64 {
        match self {
            Self::On(date) => (date - today).num_days() as f64,
            Self::Never => f64::INFINITY,
        }
    }

    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(date),
            Self::Never => None,
        }
    }

    pub fn is_never(self) -> bool {
        matches!(self, Self::Never)
    }

    /// Text form used by the record store.
    pub fn to_stored(self) -> String {
        match self {
            Self::On(date) => date.format(DATE_FORMAT).to_string(),
            Self::Never => NEVER.to_string(),
        }
    }

    /// Parses the record-store text form.
    pub fn from_stored(value: &str) -> Option<Self> {
        if value == NEVER {
            return Some(Self::Never);
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(Self::On)
    }
}

impl Default for Due {
    fn default() -> Self {
        Self::Never
    }
}

impl Display for Due {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Never => f.write_str(NEVER),
        }
    }
}

/// Rejected user date input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("invalid date `{0}`; expected YYYY-MM-DD, MM-DD or never")]
    Format(String),
    #[error("date `{0}` does not exist")]
    OutOfRange(String),
}

/// Parses a user-supplied due date relative to `today`.
///
/// `MM-DD` resolves to the current year, or to the next year when that day
/// has already passed. Past `YYYY-MM-DD` dates are returned as-is; rejecting
/// them is a business rule owned by the service layer.
pub fn parse_due_input(input: &str, today: NaiveDate) -> Result<Due, DateParseError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case(NEVER) {
        return Ok(Due::Never);
    }
    parse_date_input(trimmed, today).map(Due::On)
}

/// Parses `YYYY-MM-DD` or `MM-DD` into a calendar date.
pub fn parse_date_input(input: &str, today: NaiveDate) -> Result<NaiveDate, DateParseError> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }

    let mut parts = trimmed.split('-');
    let (Some(month), Some(day), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DateParseError::Format(trimmed.to_string()));
    };
    let (Ok(month), Ok(day)) = (month.parse::<u32>(), day.parse::<u32>()) else {
        return Err(DateParseError::Format(trimmed.to_string()));
    };

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Ok(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            .ok_or_else(|| DateParseError::OutOfRange(trimmed.to_string())),
    }
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}
