//! Input validation shared by tracker use-cases.
//!
//! # Invariants
//! - Every check runs before the store is mutated.
//! - Validators never consult the clock; callers pass `today`.

use crate::model::dates::{parse_date_input, parse_due_input, Due};
use crate::model::task::clamp_priority;
use crate::service::error::{TrackerError, TrackerResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PROJECT_NAME_CHARS: usize = 3;
pub const MAX_PROJECT_NAME_CHARS: usize = 25;

static PROJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid project name regex"));

/// Checks a new project name.
///
/// `exists` reports whether another project already uses the name.
pub fn validate_project_name(name: &str, exists: bool) -> TrackerResult<()> {
    let fail = |reason: &str| Err(TrackerError::Validation(format!("project \"{name}\" {reason}")));

    if exists {
        return fail("already exists");
    }
    if !PROJECT_NAME_RE.is_match(name) {
        return fail("contains invalid characters");
    }
    let chars = name.chars().count();
    if chars > MAX_PROJECT_NAME_CHARS {
        return fail("is too long");
    }
    if chars < MIN_PROJECT_NAME_CHARS {
        return fail("is too short");
    }
    if name.to_lowercase() != name {
        return fail("must be lowercase");
    }
    Ok(())
}

/// Rejects blank text and appends the trailing newline when missing.
pub fn normalize_description(text: &str) -> TrackerResult<String> {
    if text.trim().is_empty() {
        return Err(TrackerError::Validation(
            "description cannot be empty".to_string(),
        ));
    }
    let mut description = text.to_string();
    if !description.ends_with('\n') {
        description.push('\n');
    }
    Ok(description)
}

pub fn validate_time(hours: f64) -> TrackerResult<f64> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(TrackerError::Validation(format!(
            "time must be a positive number of hours, got {hours}"
        )));
    }
    Ok(hours)
}

pub fn normalize_priority(priority: u8) -> u8 {
    clamp_priority(priority)
}

/// Parses a due date; past dates need `force`.
pub fn parse_due(input: &str, today: NaiveDate, force: bool) -> TrackerResult<Due> {
    let due = parse_due_input(input, today)?;
    if let Due::On(date) = due {
        reject_past(date, today, force)?;
    }
    Ok(due)
}

/// Parses a calendar date; past dates need `force`.
pub fn parse_future_date(input: &str, today: NaiveDate, force: bool) -> TrackerResult<NaiveDate> {
    let date = parse_date_input(input, today)?;
    reject_past(date, today, force)?;
    Ok(date)
}

fn reject_past(date: NaiveDate, today: NaiveDate, force: bool) -> TrackerResult<()> {
    if date < today && !force {
        return Err(TrackerError::Validation(format!(
            "date {date} is in the past; use force to accept it"
        )));
    }
    Ok(())
}
