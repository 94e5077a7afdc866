//! Slot ranking.
//!
//! Every slot gets a weight in `(.., 0.5]`. Slots that fall completely
//! inside the morning focus window get the full [`FOCUS_TIME_RANK`]; every
//! other slot loses a little weight for each minute it starts after
//! midnight, so earlier slots rank higher.

use chrono::{NaiveTime, Timelike};

use crate::error::{SlotError, SlotResult};
use crate::model::CandidateSlot;
use crate::time::minutes_since_midnight;

/// Weight given to slots inside the focus window.
pub const FOCUS_TIME_RANK: f64 = 0.5;

const URGENCY_DIVISOR: f64 = 10_000.0;

/// The part of the day meetings are preferred in, as minutes since
/// midnight UTC. Defaults to 07:00-09:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTime {
    start_minute: u32,
    end_minute: u32,
}

impl Default for FocusTime {
    fn default() -> Self {
        Self {
            start_minute: 7 * 60,
            end_minute: 9 * 60,
        }
    }
}

impl FocusTime {
    /// Creates a focus window, rejecting `start >= end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> SlotResult<Self> {
        if start >= end {
            return Err(SlotError::invalid_request(format!(
                "focus time start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self {
            start_minute: start.hour() * 60 + start.minute(),
            end_minute: end.hour() * 60 + end.minute(),
        })
    }

    /// Returns true if the slot starts and ends on the same UTC date and
    /// lies within the focus window.
    pub fn covers(&self, slot: &CandidateSlot) -> bool {
        slot.start_time.date_naive() == slot.end_time.date_naive()
            && minutes_since_midnight(slot.start_time) >= self.start_minute
            && minutes_since_midnight(slot.end_time) <= self.end_minute
    }
}

/// Assigns weights to slots and orders them by desirability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotClassifier {
    focus: FocusTime,
}

impl SlotClassifier {
    /// Creates a classifier that favours slots inside `focus`.
    pub fn new(focus: FocusTime) -> Self {
        Self { focus }
    }

    /// The focus window used for weighting.
    pub fn focus_time(&self) -> &FocusTime {
        &self.focus
    }

    /// Returns true if `slot` lies inside the focus window.
    pub fn is_focus_time(&self, slot: &CandidateSlot) -> bool {
        self.focus.covers(slot)
    }

    /// Computes the weight of one slot.
    pub fn weigh(&self, slot: &CandidateSlot) -> f64 {
        if self.is_focus_time(slot) {
            FOCUS_TIME_RANK
        } else {
            FOCUS_TIME_RANK - f64::from(minutes_since_midnight(slot.start_time)) / URGENCY_DIVISOR
        }
    }

    /// Weighs every slot and sorts them, highest weight first.
    ///
    /// Equal weights are ordered by start time; the sort is stable, so slots
    /// with equal weight and start keep their input order. Any weight already
    /// present on an input slot is overwritten.
    pub fn classify(&self, slots: Vec<CandidateSlot>) -> Vec<CandidateSlot> {
        let mut ranked: Vec<CandidateSlot> = slots
            .into_iter()
            .map(|slot| {
                let weight = self.weigh(&slot);
                slot.with_weight(weight)
            })
            .collect();

        ranked.sort_by(|a, b| {
            let wa = a.weight.unwrap_or(f64::MIN);
            let wb = b.weight.unwrap_or(f64::MIN);
            wb.total_cmp(&wa).then_with(|| a.start_time.cmp(&b.start_time))
        });
        ranked
    }
}

/// Ranks slots with the default 07:00-09:00 UTC focus window.
pub fn classify(slots: Vec<CandidateSlot>) -> Vec<CandidateSlot> {
    SlotClassifier::default().classify(slots)
}
