//! UTC time utilities.
//!
//! This module provides [`TimeWindow`] for search ranges and working
//! intervals, [`WorkingHours`] for the fixed working calendar candidate
//! slots are generated in, and small helpers for UTC civil-time arithmetic.
//!
//! Everything here is UTC. Dates, weekdays and minutes-of-day are always
//! derived from the UTC representation of a timestamp.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Returns the number of minutes since 00:00 UTC on the timestamp's date.
pub fn minutes_since_midnight(dt: DateTime<Utc>) -> u32 {
    dt.hour() * 60 + dt.minute()
}

/// Returns `true` for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A time window in UTC.
///
/// `start` is inclusive. [`overlaps`](Self::overlaps) treats the window as
/// half-open `[start, end)`, while [`encloses`](Self::encloses) accepts
/// intervals ending exactly at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates a non-empty time window, rejecting `start >= end`.
    pub fn try_new(start: DateTime<Utc>, end: DateTime<Utc>) -> SlotResult<Self> {
        if start >= end {
            return Err(SlotError::invalid_request(format!(
                "start_time {} must be before end_time {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if the interval `[start, end)` lies entirely inside this window.
    ///
    /// An interval ending exactly at the window end is enclosed.
    pub fn encloses(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start && end <= self.end
    }

    /// Checks if the interval `[start, end)` overlaps this window.
    ///
    /// Touching boundaries do not overlap: an interval that ends exactly at
    /// the window start, or starts exactly at the window end, is disjoint.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && self.start < end
    }

    /// Returns every UTC calendar date touched by the window, ascending.
    ///
    /// Both the start date and the end date are included.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.end.date_naive();
        self.start
            .date_naive()
            .iter_days()
            .take_while(move |date| *date <= last)
    }
}

/// The working calendar candidate slots are generated in.
///
/// Each business day (Monday to Friday, UTC) has one working interval
/// `[start, end)` at the same UTC wall-clock times. Candidates start at
/// `start` and step by `granularity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    start: NaiveTime,
    end: NaiveTime,
    granularity: Duration,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            granularity: Duration::minutes(15),
        }
    }
}

impl WorkingHours {
    /// Creates a working calendar from day start/end times and a step.
    pub fn new(start: NaiveTime, end: NaiveTime, granularity: Duration) -> SlotResult<Self> {
        if start >= end {
            return Err(SlotError::invalid_request(format!(
                "working day start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        if granularity <= Duration::zero() {
            return Err(SlotError::invalid_request(
                "slot granularity must be positive",
            ));
        }
        Ok(Self {
            start,
            end,
            granularity,
        })
    }

    /// Parses a working hours specification (format: "HH:MM-HH:MM").
    ///
    /// Uses the default 15 minute step.
    pub fn parse(spec: &str) -> SlotResult<Self> {
        let (start, end) = parse_work_hours(spec).ok_or_else(|| {
            SlotError::invalid_request(format!(
                "invalid working hours {:?}, expected HH:MM-HH:MM",
                spec
            ))
        })?;
        Self::new(start, end, Self::default().granularity)
    }

    /// Builder: set the step between consecutive candidate starts.
    pub fn with_granularity(self, granularity: Duration) -> SlotResult<Self> {
        Self::new(self.start, self.end, granularity)
    }

    /// Start of the working day (UTC wall clock).
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// End of the working day (UTC wall clock).
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Step between consecutive candidate starts.
    pub fn granularity(&self) -> Duration {
        self.granularity
    }

    /// Length of one working day.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the working interval for the given date.
    pub fn for_date(&self, date: NaiveDate) -> TimeWindow {
        TimeWindow::new(
            date.and_time(self.start).and_utc(),
            date.and_time(self.end).and_utc(),
        )
    }
}

/// Parses "HH:MM-HH:MM" into start and end times.
fn parse_work_hours(spec: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = spec.split_once('-')?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?;
    Some((start, end))
}
