use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn first_of_month(month: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
}

/// Number of days in a zero-based month, leap years included.
pub fn days_in_month(month: u32, year: i32) -> u32 {
    let (month, year) = advance_month(month, year, 0);
    let (next_month, next_year) = advance_month(month, year, 1);
    match (first_of_month(month, year), first_of_month(next_month, next_year)) {
        (Some(start), Some(end)) => (end - start).num_days() as u32,
        // Outside chrono's representable range.
        _ => 0,
    }
}

/// Weekday of the 1st of the month, 0 = Sunday.
pub fn first_weekday(month: u32, year: i32) -> u32 {
    let (month, year) = advance_month(month, year, 0);
    first_of_month(month, year).map_or(0, |date| date.weekday().num_days_from_sunday())
}

/// Moves a zero-based month by `delta`, carrying into the year.
pub fn advance_month(month: u32, year: i32, delta: i32) -> (u32, i32) {
    let absolute = i64::from(year) * 12 + i64::from(month) + i64::from(delta);
    let year = absolute.div_euclid(12) as i32;
    let month = absolute.rem_euclid(12) as u32;
    (month, year)
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month % 12) as usize]
}

/// Cell enumeration for a month grid: blanks before the 1st, then each day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days_in_month: u32,
}

impl MonthLayout {
    pub fn days(&self) -> impl Iterator<Item = DateKey> + '_ {
        (1..=self.days_in_month).map(move |day| DateKey {
            year: self.year,
            month: self.month,
            day,
        })
    }

    /// Total cells including the trailing blanks that close the last week.
    pub fn cell_count(&self) -> u32 {
        let used = self.leading_blanks + self.days_in_month;
        used.div_ceil(7) * 7
    }
}

pub fn month_layout(month: u32, year: i32) -> MonthLayout {
    let (month, year) = advance_month(month, year, 0);
    MonthLayout {
        year,
        month,
        leading_blanks: first_weekday(month, year),
        days_in_month: days_in_month(month, year),
    }
}

/// The month currently on screen. Moving it never touches stored assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCursor {
    pub year: i32,
    pub month: u32,
}

impl Default for ViewCursor {
    fn default() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month0(),
        }
    }
}

impl ViewCursor {
    pub fn new(year: i32, month: u32) -> Self {
        let (month, year) = advance_month(month, year, 0);
        Self { year, month }
    }

    pub fn previous(&mut self) {
        self.shift(-1);
    }

    pub fn next(&mut self) {
        self.shift(1);
    }

    pub fn jump(&mut self, year: i32, month: u32) {
        *self = Self::new(year, month);
    }

    fn shift(&mut self, delta: i32) {
        let (month, year) = advance_month(self.month, self.year, delta);
        self.month = month;
        self.year = year;
    }

    pub fn layout(&self) -> MonthLayout {
        month_layout(self.month, self.year)
    }

    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}
