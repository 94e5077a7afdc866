//! Validated slot search requests.

use chrono::{DateTime, Duration, Utc};

use crate::error::{SlotError, SlotResult};
use crate::model::Attendee;
use crate::time::TimeWindow;

/// A request for free slots shared by a set of attendees.
///
/// Construction enforces `duration > 0` and `start_time < end_time`, so a
/// `SearchRequest` handed to the finder is always well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    attendees: Vec<Attendee>,
    duration: Duration,
    window: TimeWindow,
}

impl SearchRequest {
    /// Creates a search request.
    pub fn new(
        attendees: Vec<Attendee>,
        duration: Duration,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> SlotResult<Self> {
        if duration <= Duration::zero() {
            return Err(SlotError::invalid_request(format!(
                "duration must be positive, got {}s",
                duration.num_seconds()
            )));
        }
        let window = TimeWindow::try_new(start_time, end_time)?;
        Ok(Self {
            attendees,
            duration,
            window,
        })
    }

    /// Attendees whose meetings must be avoided.
    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    /// Desired meeting length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The search window.
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Start of the search window (inclusive).
    pub fn start_time(&self) -> DateTime<Utc> {
        self.window.start
    }

    /// End of the search window.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.window.end
    }
}
