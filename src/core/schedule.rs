//! Schedule values: parsing, feasibility checking, and construction.
//!
//! A [`Schedule`] is built once per expression string and is immutable
//! afterwards; it can be cached and shared read-only across any number of
//! concurrent callers of the search engine.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::aliases;
use crate::core::calendar::days_in_month;
use crate::core::field::{parse_field, FieldKind, ParsedField};

/// Errors that can occur when constructing a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A field term does not parse or matches no values.
    #[error("invalid schedule syntax: {0}")]
    InvalidSyntax(String),

    /// Structurally valid fields whose intersection can never be satisfied.
    #[error("infeasible schedule: {0}")]
    Infeasible(String),

    /// Unknown timezone name.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// A parsed cron schedule in the six-field dialect
/// `minute hour day month weekday [year]`.
///
/// Missing trailing fields default to `*`, so a plain 5-field cron string
/// allows any year. Construction fails fast: syntax and feasibility problems
/// surface here, never at first-fire time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRepr", into = "ScheduleRepr")]
pub struct Schedule {
    pub(crate) expression: String,
    pub(crate) timezone: Option<Tz>,
    pub(crate) minutes: BTreeSet<u32>,
    pub(crate) hours: BTreeSet<u32>,
    pub(crate) days: BTreeSet<u32>,
    pub(crate) months: BTreeSet<u32>,
    pub(crate) weekdays: BTreeSet<u32>,
    pub(crate) years: BTreeSet<u32>,
    pub(crate) last_day_of_month: bool,
    pub(crate) last_weekday_of_month: bool,
}

impl Schedule {
    /// Parse a schedule expression.
    ///
    /// Accepts the six-field dialect (trailing fields optional) and the
    /// whole-expression macros `@yearly`, `@annually`, `@monthly`,
    /// `@weekly`, `@daily`, `@hourly`, and `@minutely`.
    pub fn parse(expression: impl Into<String>) -> Result<Self, ScheduleError> {
        let expression = expression.into();
        let expanded = aliases::expand_macro(&expression);

        let parts: Vec<&str> = expanded.split_whitespace().collect();
        if parts.is_empty() {
            return Err(ScheduleError::InvalidSyntax("empty expression".into()));
        }
        if parts.len() > FieldKind::ALL.len() {
            return Err(ScheduleError::InvalidSyntax(format!(
                "expected at most 6 fields, got {}",
                parts.len()
            )));
        }

        let field = |kind: FieldKind, idx: usize| -> Result<ParsedField, ScheduleError> {
            parse_field(kind, parts.get(idx).copied().unwrap_or("*"))
        };
        let minutes = field(FieldKind::Minute, 0)?;
        let hours = field(FieldKind::Hour, 1)?;
        let days = field(FieldKind::DayOfMonth, 2)?;
        let months = field(FieldKind::Month, 3)?;
        let weekdays = field(FieldKind::Weekday, 4)?;
        let years = field(FieldKind::Year, 5)?;

        let schedule = Self {
            expression,
            timezone: None,
            last_day_of_month: days.had_last,
            last_weekday_of_month: weekdays.had_last,
            minutes: minutes.values,
            hours: hours.values,
            days: days.values,
            months: months.values,
            weekdays: weekdays.values,
            years: years.values,
        };
        schedule.check_feasibility()?;
        Ok(schedule)
    }

    /// Parse a schedule and attach an evaluation timezone.
    ///
    /// The zone is consulted by [`Schedule::next_fire`], which evaluates the
    /// civil-time fields in that zone and reports the result in UTC.
    pub fn with_timezone(
        expression: impl Into<String>,
        timezone: impl AsRef<str>,
    ) -> Result<Self, ScheduleError> {
        let tz: Tz = timezone
            .as_ref()
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(timezone.as_ref().to_string()))?;
        let mut schedule = Self::parse(expression)?;
        schedule.timezone = Some(tz);
        Ok(schedule)
    }

    /// Reject day-of-month constraints that no admissible (year, month) pair
    /// can satisfy, so the search engine cannot spin over an unsatisfiable
    /// schedule (e.g. day 31 with the month set restricted to February).
    fn check_feasibility(&self) -> Result<(), ScheduleError> {
        let Some(&min_day) = self.days.first() else {
            return Ok(()); // unreachable: parsing rejects empty sets
        };
        if min_day < 28 {
            return Ok(());
        }
        let reachable = self.years.iter().any(|&y| {
            self.months
                .iter()
                .any(|&m| days_in_month(y as i32, m) >= min_day)
        });
        if reachable {
            Ok(())
        } else {
            Err(ScheduleError::Infeasible(format!(
                "day {} is out of reach for every admissible month",
                min_day
            )))
        }
    }

    /// The original expression string.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The evaluation timezone, when one was attached.
    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Serialized form: the expression (and zone) only, re-parsed on load.
#[derive(Serialize, Deserialize)]
struct ScheduleRepr {
    expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
}

impl From<Schedule> for ScheduleRepr {
    fn from(schedule: Schedule) -> Self {
        Self {
            expression: schedule.expression,
            timezone: schedule.timezone.map(|tz| tz.name().to_string()),
        }
    }
}

impl TryFrom<ScheduleRepr> for Schedule {
    type Error = ScheduleError;

    fn try_from(repr: ScheduleRepr) -> Result<Self, Self::Error> {
        match repr.timezone {
            Some(tz) => Schedule::with_timezone(repr.expression, tz),
            None => Schedule::parse(repr.expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_five_field_expression_defaults_year() {
        let schedule = Schedule::parse("0 0 * * *").unwrap();
        assert_eq!(schedule.years.len(), 130); // 1970..=2099
        assert_eq!(schedule.expression(), "0 0 * * *");
    }

    #[test]
    fn test_parse_partial_expression_pads_with_wildcards() {
        let schedule = Schedule::parse("30 6").unwrap();
        assert_eq!(
            schedule.minutes.iter().copied().collect::<Vec<_>>(),
            vec![30]
        );
        assert_eq!(schedule.hours.iter().copied().collect::<Vec<_>>(), vec![6]);
        assert_eq!(schedule.days.len(), 31);
        assert_eq!(schedule.weekdays.len(), 7);
    }

    #[test]
    fn test_parse_six_field_expression_with_year() {
        let schedule = Schedule::parse("0 0 1 1 * 2030").unwrap();
        assert_eq!(
            schedule.years.iter().copied().collect::<Vec<_>>(),
            vec![2030]
        );
    }

    #[test]
    fn test_too_many_fields_is_error() {
        let result = Schedule::parse("0 0 1 1 * 2030 extra");
        assert!(matches!(result, Err(ScheduleError::InvalidSyntax(_))));
    }

    #[test]
    fn test_empty_expression_is_error() {
        assert!(Schedule::parse("   ").is_err());
    }

    #[test]
    fn test_unknown_macro_is_error() {
        assert!(Schedule::parse("@fortnightly").is_err());
    }

    #[test]
    fn test_macro_expansion() {
        let schedule = Schedule::parse("@weekly").unwrap();
        assert_eq!(
            schedule.weekdays.iter().copied().collect::<Vec<_>>(),
            vec![0]
        );
        assert_eq!(schedule.expression(), "@weekly");
    }

    #[test]
    fn test_last_modifier_flags_lifted() {
        let schedule = Schedule::parse("0 0 l * *").unwrap();
        assert!(schedule.last_day_of_month);
        assert!(!schedule.last_weekday_of_month);

        let schedule = Schedule::parse("0 0 * * l5").unwrap();
        assert!(schedule.last_weekday_of_month);
        assert!(!schedule.last_day_of_month);
    }

    #[test]
    fn test_infeasible_day_for_month_set() {
        let result = Schedule::parse("0 0 31 feb *");
        assert!(matches!(result, Err(ScheduleError::Infeasible(_))));

        let result = Schedule::parse("0 0 30 2 *");
        assert!(matches!(result, Err(ScheduleError::Infeasible(_))));
    }

    #[test]
    fn test_feasible_edge_days_accepted() {
        // Feb 29 exists in leap years within the horizon.
        assert!(Schedule::parse("0 0 29 2 *").is_ok());
        assert!(Schedule::parse("0 0 31 * *").is_ok());
    }

    #[test]
    fn test_infeasible_day_for_year_restricted_february() {
        // 2023 is not a leap year, so Feb 29 2023 can never happen.
        let result = Schedule::parse("0 0 29 2 * 2023");
        assert!(matches!(result, Err(ScheduleError::Infeasible(_))));
    }

    #[test]
    fn test_with_timezone_validates_zone() {
        let schedule = Schedule::with_timezone("0 9 * * *", "America/New_York").unwrap();
        assert_eq!(
            schedule.timezone().map(|tz| tz.name()),
            Some("America/New_York")
        );

        let result = Schedule::with_timezone("0 9 * * *", "Not/AZone");
        assert!(matches!(result, Err(ScheduleError::InvalidTimezone(_))));
    }

    #[test]
    fn test_from_str_and_display_round_trip() {
        let schedule: Schedule = "*/5 * * * *".parse().unwrap();
        assert_eq!(schedule.to_string(), "*/5 * * * *");
    }

    #[test]
    fn test_serde_round_trip_reparses() {
        let schedule = Schedule::with_timezone("0 0 l * *", "Europe/Stockholm").unwrap();
        let json = serde_json::to_string(&schedule).unwrap();
        let restored: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.expression(), "0 0 l * *");
        assert!(restored.last_day_of_month);
        assert_eq!(
            restored.timezone().map(|tz| tz.name()),
            Some("Europe/Stockholm")
        );
    }

    #[test]
    fn test_serde_rejects_bad_expression() {
        let result: Result<Schedule, _> = serde_json::from_str(r#"{"expression":"61 * * * *"}"#);
        assert!(result.is_err());
    }
}
