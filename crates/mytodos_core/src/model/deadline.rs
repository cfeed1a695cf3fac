//! Deadline instant and boundary parser.
//!
//! # Responsibility
//! - Hold the single internal instant type used for reminders.
//! - Normalize every accepted textual form into that type.
//!
//! # Invariants
//! - Deadlines are local wall-clock instants with second precision.
//! - Parsing never guesses: unknown shapes and impossible calendar values
//!   are rejected.
//!
//! Accepted forms:
//! - `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, optionally with `:SS[.fff]`
//! - RFC 3339 with an explicit offset (converted to local time)
//! - `DD-MM-YYYY HH:MM`

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static ISO_DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[T ]([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.[0-9]+)?)?$",
    )
    .expect("valid iso datetime regex")
});
static DAY_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})-([0-9]{2})-([0-9]{4}) ([0-9]{2}):([0-9]{2})$")
        .expect("valid day-first regex")
});

/// Error for deadline text that matches no accepted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineParseError {
    /// Input shape is not one of the accepted forms.
    UnrecognizedFormat(String),
    /// Shape matched but the date or time does not exist.
    OutOfRange(String),
}

impl Display for DeadlineParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedFormat(value) => write!(f, "unrecognized deadline format: `{value}`"),
            Self::OutOfRange(value) => write!(f, "deadline is not a valid date/time: `{value}`"),
        }
    }
}

impl Error for DeadlineParseError {}

/// Local wall-clock instant at which a task becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline(NaiveDateTime);

impl Deadline {
    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self(value)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Signed time left until this deadline as seen from `now`.
    pub fn remaining_from(&self, now: NaiveDateTime) -> TimeDelta {
        self.0.signed_duration_since(now)
    }

    /// Parses any accepted textual form.
    pub fn parse(raw: &str) -> Result<Self, DeadlineParseError> {
        let value = raw.trim();

        if let Some(caps) = ISO_DATETIME_RE.captures(value) {
            return build(value, &caps, [1, 2, 3], [4, 5, 6]);
        }
        if let Some(caps) = DAY_FIRST_RE.captures(value) {
            return build(value, &caps, [3, 2, 1], [4, 5, 0]);
        }
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self(with_offset.with_timezone(&Local).naive_local()));
        }

        Err(DeadlineParseError::UnrecognizedFormat(value.to_string()))
    }
}

/// Builds a deadline from capture groups; group `0` in `time` means "absent".
fn build(
    value: &str,
    caps: &Captures<'_>,
    [year, month, day]: [usize; 3],
    [hour, minute, second]: [usize; 3],
) -> Result<Deadline, DeadlineParseError> {
    let out_of_range = || DeadlineParseError::OutOfRange(value.to_string());
    let field = |index: usize| -> Result<u32, DeadlineParseError> {
        if index == 0 {
            return Ok(0);
        }
        match caps.get(index) {
            Some(matched) => matched.as_str().parse::<u32>().map_err(|_| out_of_range()),
            None => Ok(0),
        }
    };

    let year = i32::try_from(field(year)?).map_err(|_| out_of_range())?;
    let date = NaiveDate::from_ymd_opt(year, field(month)?, field(day)?).ok_or_else(out_of_range)?;
    let datetime = date
        .and_hms_opt(field(hour)?, field(minute)?, field(second)?)
        .ok_or_else(out_of_range)?;
    Ok(Deadline(datetime))
}

impl FromStr for Deadline {
    type Err = DeadlineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Deadline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl Serialize for Deadline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Deadline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Deadline::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Deadline, DeadlineParseError};
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Deadline {
        Deadline::from_naive(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
    }

    #[test]
    fn both_forms_normalize_to_same_instant() {
        let iso = Deadline::parse("2025-03-14T09:30").unwrap();
        let day_first = Deadline::parse("14-03-2025 09:30").unwrap();
        assert_eq!(iso, day_first);
        assert_eq!(iso, at(2025, 3, 14, 9, 30, 0));
    }

    #[test]
    fn iso_form_accepts_space_seconds_and_fraction() {
        assert_eq!(
            Deadline::parse("2025-03-14 09:30").unwrap(),
            at(2025, 3, 14, 9, 30, 0)
        );
        assert_eq!(
            Deadline::parse(" 2025-03-14T09:30:02 ").unwrap(),
            at(2025, 3, 14, 9, 30, 2)
        );
        assert_eq!(
            Deadline::parse("2025-03-14T09:30:02.250").unwrap(),
            at(2025, 3, 14, 9, 30, 2)
        );
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        for raw in ["tomorrow", "2025/03/14 09:30", "14-03-2025", "09:30", ""] {
            assert!(
                matches!(
                    Deadline::parse(raw),
                    Err(DeadlineParseError::UnrecognizedFormat(_))
                ),
                "expected rejection for `{raw}`"
            );
        }
    }

    #[test]
    fn non_ascii_digits_are_not_a_recognized_shape() {
        for raw in ["٢٠٢٥-٠٣-١٤T09:30", "14-03-２０２５ 09:30"] {
            assert_eq!(
                Deadline::parse(raw),
                Err(DeadlineParseError::UnrecognizedFormat(raw.to_string()))
            );
        }
    }

    #[test]
    fn impossible_calendar_values_are_rejected() {
        assert!(matches!(
            Deadline::parse("31-02-2025 10:00"),
            Err(DeadlineParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Deadline::parse("2025-03-14T25:00"),
            Err(DeadlineParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn display_is_reparseable() {
        let deadline = at(2030, 12, 1, 23, 59, 5);
        assert_eq!(deadline.to_string(), "2030-12-01T23:59:05");
        assert_eq!(Deadline::parse(&deadline.to_string()).unwrap(), deadline);
    }

    #[test]
    fn serde_reads_legacy_picker_values() {
        let deadline: Deadline = serde_json::from_str(r#""2025-03-14 09:30""#).unwrap();
        assert_eq!(deadline, at(2025, 3, 14, 9, 30, 0));
        assert_eq!(
            serde_json::to_string(&deadline).unwrap(),
            r#""2025-03-14T09:30:00""#
        );
    }
}
