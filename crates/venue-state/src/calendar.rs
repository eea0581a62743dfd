//! Simulation Calendar
//!
//! The kernel counts time in whole weeks from zero. `WeekDate` is the
//! human-readable form used in reports and CLI output.
//!
//! # Example
//!
//! ```
//! use venue_state::WeekDate;
//!
//! let date = WeekDate::from_week(53);
//! assert_eq!(date.to_string(), "year_2.week_02");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of simulated weeks in a year.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Human-readable simulation date.
///
/// Serializes to strings like "year_3.week_12". Both components are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekDate {
    pub year: u32,
    pub week_of_year: u32,
}

impl WeekDate {
    /// Converts a zero-based week counter into a calendar date.
    pub fn from_week(week: u32) -> Self {
        Self {
            year: week / WEEKS_PER_YEAR + 1,
            week_of_year: week % WEEKS_PER_YEAR + 1,
        }
    }

    /// Converts back into the zero-based week counter.
    pub fn to_week(self) -> u32 {
        (self.year.saturating_sub(1)) * WEEKS_PER_YEAR + self.week_of_year.saturating_sub(1)
    }
}

impl fmt::Display for WeekDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "year_{}.week_{:02}", self.year, self.week_of_year)
    }
}

/// Error returned when a date string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWeekError {
    InvalidFormat(String),
    InvalidYear(String),
    InvalidWeek(String),
}

impl fmt::Display for ParseWeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWeekError::InvalidFormat(s) => write!(f, "invalid week date format: {}", s),
            ParseWeekError::InvalidYear(s) => write!(f, "invalid year: {}", s),
            ParseWeekError::InvalidWeek(s) => write!(f, "invalid week: {}", s),
        }
    }
}

impl std::error::Error for ParseWeekError {}

impl FromStr for WeekDate {
    type Err = ParseWeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_part, week_part) = s
            .split_once('.')
            .ok_or_else(|| ParseWeekError::InvalidFormat(s.to_string()))?;

        let year = year_part
            .strip_prefix("year_")
            .and_then(|y| y.parse::<u32>().ok())
            .filter(|y| *y >= 1)
            .ok_or_else(|| ParseWeekError::InvalidYear(year_part.to_string()))?;

        let week_of_year = week_part
            .strip_prefix("week_")
            .and_then(|w| w.parse::<u32>().ok())
            .filter(|w| (1..=WEEKS_PER_YEAR).contains(w))
            .ok_or_else(|| ParseWeekError::InvalidWeek(week_part.to_string()))?;

        Ok(Self { year, week_of_year })
    }
}

impl Serialize for WeekDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WeekDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Default for WeekDate {
    fn default() -> Self {
        Self::from_week(0)
    }
}
