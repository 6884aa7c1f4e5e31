//! Bounded forward search for the next schedule occurrence.
//!
//! Scanning minute by minute would be prohibitively slow across year-scale
//! gaps, so the engine instead derives a handful of seed instants from the
//! reference (the reference itself on a minute boundary, then the next
//! minute, hour, day, month, and year), runs each seed independently
//! through a carry-search, and returns the minimum of the successful
//! outcomes. The multiple independent seeds are load-bearing: they bound
//! worst-case iteration and guarantee forward progress where field-by-field
//! rounding alone could get stuck.

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use tracing::debug;

use crate::core::calendar::{days_in_month, CivilTime, MAX_YEAR};
use crate::core::schedule::Schedule;

/// Why a single carry pass failed to assemble a candidate.
enum Carry {
    /// Dead end for this date; advance a day and retry.
    Retry,
    /// The year field has no admissible value left; the seed is spent.
    Exhausted,
}

impl Schedule {
    /// Compute the next occurrence at or after a zone-aware reference.
    ///
    /// Civil-time fields are interpreted in the reference's zone, so the
    /// schedule tracks local wall-clock time across DST transitions; the
    /// result is expressed in that same zone, always on a zero-second
    /// minute boundary. Returns `None` when no occurrence exists within
    /// the supported 1970-2099 horizon.
    pub fn next_occurrence<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = reference.timezone();
        let local = reference.naive_local();
        let on_boundary = local.second() == 0 && local.nanosecond() == 0;
        // A civil time that falls into a DST gap does not exist in this
        // zone and must be skipped. An ambiguous one (the repeated hour of
        // a fall-back transition) resolves to its later, standard-time
        // instant; resolving to the earlier one could hand back an instant
        // a full hour before a reference sitting in the second pass.
        let resolvable = |candidate: &CivilTime| {
            candidate
                .to_naive()
                .is_some_and(|n| tz.from_local_datetime(&n).latest().is_some())
        };
        let civil = self.search(CivilTime::from_naive(&local), on_boundary, &resolvable)?;
        tz.from_local_datetime(&civil.to_naive()?).latest()
    }

    /// Compute the next occurrence at or after a naive reference.
    ///
    /// Naive references stay naive: no zone is consulted and the result
    /// carries none, preserving the caller's representation.
    pub fn next_occurrence_naive(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        let on_boundary = reference.second() == 0 && reference.nanosecond() == 0;
        let civil = self.search(CivilTime::from_naive(&reference), on_boundary, &|_| true)?;
        civil.to_naive()
    }

    /// Next fire time for a timer loop: evaluates in the schedule's
    /// configured timezone (UTC when none) and reports the result in UTC.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.timezone {
            Some(tz) => self
                .next_occurrence(&after.with_timezone(&tz))
                .map(|dt| dt.with_timezone(&Utc)),
            None => self.next_occurrence(&after),
        }
    }

    /// Run every seed through the carry-search and keep the earliest hit.
    fn search(
        &self,
        reference: CivilTime,
        include_reference: bool,
        resolvable: &dyn Fn(&CivilTime) -> bool,
    ) -> Option<CivilTime> {
        let mut seeds = Vec::with_capacity(6);
        if include_reference {
            seeds.push(reference);
        }
        if reference.minute < 59 {
            seeds.push(CivilTime {
                minute: reference.minute + 1,
                ..reference
            });
        }
        if reference.hour < 23 {
            seeds.push(CivilTime {
                hour: reference.hour + 1,
                minute: 0,
                ..reference
            });
        }
        if reference.day + 1 < days_in_month(reference.year, reference.month) {
            seeds.push(CivilTime {
                day: reference.day + 1,
                hour: 0,
                minute: 0,
                ..reference
            });
        }
        if reference.month < 11 {
            seeds.push(CivilTime {
                month: reference.month + 1,
                day: 1,
                hour: 0,
                minute: 0,
                ..reference
            });
        }
        seeds.push(CivilTime {
            year: reference.year + 1,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
        });

        let best = seeds
            .into_iter()
            .filter_map(|seed| self.carry_search(seed, resolvable))
            .min();
        if best.is_none() {
            debug!(
                expression = %self.expression,
                "schedule horizon exhausted; no next occurrence"
            );
        }
        best
    }

    /// Run one seed through the per-field minimal-advance-with-rollover loop.
    ///
    /// Any dead end advances the seed's date one calendar day and retries,
    /// so every iteration makes strict forward progress; the loop ends the
    /// moment a candidate survives all filters or the year passes the
    /// horizon.
    fn carry_search(
        &self,
        mut seed: CivilTime,
        resolvable: &dyn Fn(&CivilTime) -> bool,
    ) -> Option<CivilTime> {
        loop {
            match self.advance_fields(seed) {
                Ok(candidate) if self.admits(&candidate) && resolvable(&candidate) => {
                    return Some(candidate);
                }
                Err(Carry::Exhausted) => return None,
                Ok(_) | Err(Carry::Retry) => {}
            }
            seed = seed.next_day();
            if seed.year > MAX_YEAR {
                return None;
            }
        }
    }

    /// One pass over the fields in minute, hour, day, month, year order
    /// (weekday is validated on the finished candidate instead): each field
    /// moves to its smallest admissible value at or above the current one,
    /// and later fields keep their current values. Date validity is
    /// re-checked after every step that can break it.
    fn advance_fields(&self, seed: CivilTime) -> Result<CivilTime, Carry> {
        let mut candidate = seed;

        candidate.minute = self
            .minutes
            .range(candidate.minute..)
            .next()
            .copied()
            .ok_or(Carry::Retry)?;

        candidate.hour = self
            .hours
            .range(candidate.hour..)
            .next()
            .copied()
            .ok_or(Carry::Retry)?;

        candidate.day = self
            .days
            .range(candidate.day..)
            .next()
            .copied()
            .ok_or(Carry::Retry)?;
        if !candidate.is_valid_date() {
            return Err(Carry::Retry);
        }

        candidate.month = self
            .months
            .range(candidate.month..)
            .next()
            .copied()
            .ok_or(Carry::Retry)?;
        if !candidate.is_valid_date() {
            return Err(Carry::Retry);
        }

        let current_year = u32::try_from(candidate.year).unwrap_or(0);
        candidate.year = self
            .years
            .range(current_year..)
            .next()
            .copied()
            .ok_or(Carry::Exhausted)? as i32;
        if !candidate.is_valid_date() {
            return Err(Carry::Retry);
        }

        Ok(candidate)
    }

    /// Post-filters on a structurally valid candidate: the weekday set and
    /// the two `l`-modifier constraints.
    fn admits(&self, candidate: &CivilTime) -> bool {
        let Some(weekday) = candidate.weekday() else {
            return false;
        };
        if !self.weekdays.contains(&weekday) {
            return false;
        }
        let month_len = days_in_month(candidate.year, candidate.month);
        if self.last_day_of_month && candidate.day != month_len {
            return false;
        }
        // Last occurrence of this weekday in the month: none 7 days later.
        if self.last_weekday_of_month && candidate.day + 7 <= month_len {
            return false;
        }
        true
    }
}
