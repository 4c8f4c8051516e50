//! Signed, microsecond-resolution durations and their human-friendly
//! textual form (`+12h`, `-365 days`, `1d2h30m`).

use std::fmt;

use serde::{Deserialize, Serialize};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

/// A signed offset between two timestamps, stored at microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(i64);

/// Error returned when a duration string does not match the boundary-expr
/// grammar (`[+|-] <integer> (d|days|h|hours|m|min|minutes|s|seconds)`,
/// possibly repeated).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration literal {0:?}")]
pub struct DurationParseError(pub String);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn from_micros(micros: i64) -> Self {
        Duration(micros)
    }

    pub fn as_micros(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Duration {
        Duration(self.0.abs())
    }

    pub fn negate(self) -> Duration {
        Duration(-self.0)
    }

    /// Parses a duration literal: an optional leading sign followed by one
    /// or more `<integer><unit>` terms (e.g. `+12h`, `-365days`, `1d2h30m`).
    /// A sign is only legal before the first term; terms after it share it.
    pub fn parse(text: &str) -> Result<Duration, DurationParseError> {
        let trimmed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if trimmed.is_empty() {
            return Err(DurationParseError(text.to_string()));
        }

        let (sign, rest) = match trimmed.as_bytes()[0] {
            b'+' => (1i64, &trimmed[1..]),
            b'-' => (-1i64, &trimmed[1..]),
            _ => (1i64, trimmed.as_str()),
        };
        if rest.is_empty() {
            return Err(DurationParseError(text.to_string()));
        }

        let mut micros: i64 = 0;
        let mut cursor = rest;
        let mut saw_term = false;
        while !cursor.is_empty() {
            let digit_end = cursor
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(cursor.len());
            if digit_end == 0 {
                return Err(DurationParseError(text.to_string()));
            }
            let (digits, after_digits) = cursor.split_at(digit_end);
            let value: i64 = digits
                .parse()
                .map_err(|_| DurationParseError(text.to_string()))?;

            let unit_end = after_digits
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(after_digits.len());
            let (unit, remainder) = after_digits.split_at(unit_end);
            let unit_micros = unit_to_micros(unit).ok_or_else(|| DurationParseError(text.to_string()))?;

            micros += value * unit_micros;
            saw_term = true;
            cursor = remainder;
        }

        if !saw_term {
            return Err(DurationParseError(text.to_string()));
        }

        Ok(Duration(sign * micros))
    }
}

fn unit_to_micros(unit: &str) -> Option<i64> {
    match unit {
        "d" | "days" | "day" => Some(MICROS_PER_DAY),
        "h" | "hours" | "hour" => Some(MICROS_PER_HOUR),
        "m" | "min" | "minutes" | "minute" => Some(MICROS_PER_MINUTE),
        "s" | "seconds" | "second" => Some(MICROS_PER_SECOND),
        _ => None,
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

impl std::ops::Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Duration {
    type Output = Duration;
    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}
