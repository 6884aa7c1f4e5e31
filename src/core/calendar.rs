//! Civil-time helpers shared by the feasibility check and the search
//! engine: month lengths, leap years, and day-level carry arithmetic.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Last year of the supported horizon; searches past it report no occurrence.
pub(crate) const MAX_YEAR: i32 = 2099;

pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// A minute-resolution civil timestamp, independent of any zone.
///
/// Field order gives the derived `Ord` chronological meaning, which is what
/// the search engine relies on when taking the minimum across seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct CivilTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl CivilTime {
    /// Truncate a naive timestamp to minute resolution.
    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }

    /// Whether the day exists in its month.
    pub fn is_valid_date(&self) -> bool {
        self.day <= days_in_month(self.year, self.month)
    }

    /// Midnight of the following day, carrying into month and year.
    pub fn next_day(&self) -> Self {
        let (year, month, day) = if self.day < days_in_month(self.year, self.month) {
            (self.year, self.month, self.day + 1)
        } else if self.month < 12 {
            (self.year, self.month + 1, 1)
        } else {
            (self.year + 1, 1, 1)
        };
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
        }
    }

    /// Day of week with Sunday = 0, or `None` for an invalid date.
    pub fn weekday(&self) -> Option<u32> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .map(|d| d.weekday().num_days_from_sunday())
    }

    /// Convert back to a naive timestamp with zero seconds.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, 0))
    }
}
