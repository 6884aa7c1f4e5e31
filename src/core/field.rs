//! Field-level parsing for the six cron fields.
//!
//! Each field is a comma-separated list of terms; the admissible set is the
//! union of every term's contribution to the field's numeric domain.
//! Supported term forms: `*`/`?`, a value or 3-letter name, `l`/`lN` (last
//! modifier), `A-B` ranges, and `/S` steps on any of those.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::core::aliases;
use crate::core::schedule::ScheduleError;

/// One of the six semantic roles in a schedule expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    Weekday,
    Year,
}

impl FieldKind {
    /// All six fields in expression order.
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::Weekday,
        FieldKind::Year,
    ];

    /// The inclusive numeric domain of this field.
    pub fn domain(self) -> RangeInclusive<u32> {
        match self {
            FieldKind::Minute => 0..=59,
            FieldKind::Hour => 0..=23,
            FieldKind::DayOfMonth => 1..=31,
            FieldKind::Month => 1..=12,
            FieldKind::Weekday => 0..=6,
            FieldKind::Year => 1970..=2099,
        }
    }

    /// Field name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day",
            FieldKind::Month => "month",
            FieldKind::Weekday => "weekday",
            FieldKind::Year => "year",
        }
    }
}

/// The parsed form of a single field: its admissible values plus whether
/// any term carried a `l` (last) modifier.
#[derive(Debug, Clone)]
pub(crate) struct ParsedField {
    pub values: BTreeSet<u32>,
    pub had_last: bool,
}

/// Parse one raw field expression into its admissible value set.
///
/// Every term must contribute at least one value; a term that matches
/// nothing signals a malformed expression, not an empty result.
pub(crate) fn parse_field(kind: FieldKind, raw: &str) -> Result<ParsedField, ScheduleError> {
    let raw = raw.to_ascii_lowercase();
    let mut values = BTreeSet::new();
    let mut had_last = false;

    for term in raw.split(',') {
        let contribution = parse_term(kind, term, &mut had_last)?;
        if contribution.is_empty() {
            return Err(ScheduleError::InvalidSyntax(format!(
                "term '{}' matches no {} values",
                term,
                kind.name()
            )));
        }
        values.extend(contribution);
    }

    Ok(ParsedField { values, had_last })
}

/// Evaluate a single term against the field's domain.
fn parse_term(
    kind: FieldKind,
    term: &str,
    had_last: &mut bool,
) -> Result<Vec<u32>, ScheduleError> {
    if term.is_empty() {
        return Err(ScheduleError::InvalidSyntax(format!(
            "empty term in {} field",
            kind.name()
        )));
    }

    let (body, step) = match term.split_once('/') {
        Some((body, raw_step)) => {
            let step = raw_step.parse::<u32>().map_err(|_| {
                ScheduleError::InvalidSyntax(format!(
                    "invalid step '{}' in {} field",
                    raw_step,
                    kind.name()
                ))
            })?;
            if step == 0 {
                return Err(ScheduleError::InvalidSyntax(format!(
                    "step must be non-zero in {} field",
                    kind.name()
                )));
            }
            (body, Some(step))
        }
        None => (term, None),
    };

    let domain = kind.domain();
    // Base values plus the congruence anchor consulted when a step follows.
    let (values, anchor): (Vec<u32>, u32) = if body == "*" || body == "?" {
        (domain.clone().collect(), 0)
    } else if let Some((raw_lo, raw_hi)) = body.split_once('-') {
        let raw_lo = match raw_lo.strip_prefix('l') {
            Some(rest) => {
                *had_last = true;
                rest
            }
            None => raw_lo,
        };
        let a = resolve_value(kind, raw_lo)?;
        let b = resolve_value(kind, raw_hi)?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        (
            domain.clone().filter(|v| (lo..=hi).contains(v)).collect(),
            a,
        )
    } else {
        let body = match body.strip_prefix('l') {
            Some(rest) => {
                *had_last = true;
                rest
            }
            None => body,
        };
        if body.is_empty() {
            // Bare `l`: the full domain, flagged.
            (domain.clone().collect(), 0)
        } else {
            let value = resolve_value(kind, body)?;
            if step.is_some() {
                // `A/S` steps over the whole domain anchored at A.
                (domain.clone().collect(), value)
            } else {
                (domain.clone().filter(|v| *v == value).collect(), value)
            }
        }
    };

    let values = match step {
        Some(step) => values
            .into_iter()
            .filter(|v| v % step == anchor % step)
            .collect(),
        None => values,
    };
    Ok(values)
}

/// Resolve a token through the alias table, falling back to a plain number.
fn resolve_value(kind: FieldKind, token: &str) -> Result<u32, ScheduleError> {
    if let Some(code) = aliases::name_alias(kind, token) {
        return Ok(code);
    }
    token.parse::<u32>().map_err(|_| {
        ScheduleError::InvalidSyntax(format!(
            "unrecognized {} value '{}'",
            kind.name(),
            token
        ))
    })
}
