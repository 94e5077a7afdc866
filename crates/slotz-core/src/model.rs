//! Domain types for slot search.
//!
//! - [`Attendee`]: a person identified by a unique, case-sensitive name
//! - [`Meeting`]: a busy interval shared by one or more attendees
//! - [`CandidateSlot`]: a proposed meeting placement, optionally weighted

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::time::TimeWindow;

/// A meeting attendee.
///
/// Attendees are compared by name only; names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Attendee {
    /// The attendee's unique name.
    pub name: String,
}

impl Attendee {
    /// Creates a new attendee.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the attendee's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Attendee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An existing commitment blocking `[start_time, end_time)` for its attendees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMeeting")]
pub struct Meeting {
    attendees: Vec<Attendee>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl Meeting {
    /// Creates a new meeting.
    ///
    /// Fails if `start_time` is not strictly before `end_time` or if no
    /// attendee is given.
    pub fn new(
        attendees: Vec<Attendee>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> SlotResult<Self> {
        if attendees.is_empty() {
            return Err(SlotError::invalid_meeting("a meeting needs at least one attendee"));
        }
        if start_time >= end_time {
            return Err(SlotError::invalid_meeting(format!(
                "start_time {} must be before end_time {}",
                start_time.to_rfc3339(),
                end_time.to_rfc3339()
            )));
        }
        Ok(Self {
            attendees,
            start_time,
            end_time,
        })
    }

    /// The attendees sharing this meeting.
    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    /// Start of the busy interval (inclusive).
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// End of the busy interval (exclusive).
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Returns true if any of the given attendees takes part in this meeting.
    pub fn involves_any(&self, attendees: &[Attendee]) -> bool {
        self.attendees.iter().any(|a| attendees.contains(a))
    }

    /// Returns true if this meeting overlaps the window (half-open semantics).
    pub fn intersects(&self, window: &TimeWindow) -> bool {
        window.overlaps(self.start_time, self.end_time)
    }

    /// Returns true if this meeting blocks the given slot.
    ///
    /// A meeting ending exactly when the slot starts, or starting exactly
    /// when it ends, does not conflict.
    pub fn conflicts_with(&self, slot: &CandidateSlot) -> bool {
        slot.start_time < self.end_time && self.start_time < slot.end_time
    }
}

#[derive(Deserialize)]
struct RawMeeting {
    attendees: Vec<Attendee>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl TryFrom<RawMeeting> for Meeting {
    type Error = SlotError;

    fn try_from(raw: RawMeeting) -> Result<Self, Self::Error> {
        Meeting::new(raw.attendees, raw.start_time, raw.end_time)
    }
}

/// A possible meeting placement.
///
/// `weight` stays `None` until the slot has been ranked by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSlot {
    /// Slot start (inclusive).
    pub start_time: DateTime<Utc>,
    /// Slot end (exclusive).
    pub end_time: DateTime<Utc>,
    /// Desirability, higher is better.
    pub weight: Option<f64>,
}

impl CandidateSlot {
    /// Creates an unweighted slot of the given duration.
    ///
    /// # Panics
    ///
    /// Panics if `start_time + duration` is out of range.
    pub fn new(start_time: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start_time,
            end_time: start_time + duration,
            weight: None,
        }
    }

    /// Returns the slot length.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Builder method to set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Returns true once the classifier has weighted this slot.
    pub fn is_weighted(&self) -> bool {
        self.weight.is_some()
    }
}
