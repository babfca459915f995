use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::calendar;

/// Identifies one calendar day. `month` is zero-based (0 = January).
///
/// Ordering is structural: year, then month, then day. The string form
/// `"{year}-{month}-{day}"` is only used at the persistence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateKeyError {
    #[error("date key '{0}' is not in year-month-day form")]
    Malformed(String),
    #[error("month index {0} is outside 0..=11")]
    MonthOutOfRange(u32),
    #[error("day {day} does not exist in month {month} of {year}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },
}

impl DateKey {
    /// Builds a key after checking the day exists in that month.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateKeyError> {
        if month > 11 {
            return Err(DateKeyError::MonthOutOfRange(month));
        }
        if day == 0 || day > calendar::days_in_month(month, year) {
            return Err(DateKeyError::DayOutOfRange { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
            day: date.day(),
        }
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day)
    }

    pub fn is_in_month(&self, month: u32, year: i32) -> bool {
        self.year == year && self.month == month
    }

    /// Smallest key of the given month, for range scans.
    pub(crate) fn month_start(month: u32, year: i32) -> Self {
        Self { year, month, day: 0 }
    }

    /// Largest key of the given month, for range scans.
    pub(crate) fn month_end(month: u32, year: i32) -> Self {
        Self {
            year,
            month,
            day: u32::MAX,
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DateKeyError::Malformed(s.to_string());
        // A leading '-' belongs to a negative year.
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s),
        };
        let mut parts = rest.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        let day: u32 = day.parse().map_err(|_| malformed())?;
        let key = Self::new(sign * year, month, day)?;
        // Only the canonical spelling is accepted, so "2025-08-03" and
        // "2025-8-3" cannot both name one key.
        if key.to_string() != s {
            return Err(malformed());
        }
        Ok(key)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
