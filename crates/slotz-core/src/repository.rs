//! Attendee and meeting lookup.
//!
//! The finder only needs [`MeetingRepository`]; the request boundary also
//! resolves names through [`AttendeeDirectory`]. [`InMemoryRepository`]
//! implements both and is what the server and the offline CLI use.
//! `ErrorRepository` always fails and exists to exercise error paths in
//! tests (enabled for other crates by the `test-support` feature).

use crate::error::{SlotError, SlotResult};
use crate::model::{Attendee, Meeting};
use crate::time::TimeWindow;

/// Read-only lookup of meetings by attendee set and time range.
///
/// Implementations must be `Send + Sync`: the server shares one repository
/// across connection tasks.
pub trait MeetingRepository: Send + Sync {
    /// Returns every meeting involving at least one of `attendees` whose
    /// interval intersects `window`.
    ///
    /// An empty attendee list returns no meetings.
    fn meetings_for(&self, attendees: &[Attendee], window: &TimeWindow)
    -> SlotResult<Vec<Meeting>>;

    /// Returns every stored meeting, for listings.
    fn all_meetings(&self) -> SlotResult<Vec<Meeting>>;
}

/// Read-only lookup of attendees by name.
pub trait AttendeeDirectory: Send + Sync {
    /// Resolves names to attendees. Unknown names are dropped.
    ///
    /// Matching is exact and case-sensitive; results follow repository order.
    fn find_by_names(&self, names: &[String]) -> SlotResult<Vec<Attendee>>;

    /// Returns all known attendees in registration order.
    fn attendees(&self) -> SlotResult<Vec<Attendee>>;
}

/// Everything the request boundary needs from a store.
pub trait Repository: MeetingRepository + AttendeeDirectory {}

impl<T: MeetingRepository + AttendeeDirectory + ?Sized> Repository for T {}

/// A repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    attendees: Vec<Attendee>,
    meetings: Vec<Meeting>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an attendee. Returns false if the name is already taken.
    pub fn add_attendee(&mut self, attendee: Attendee) -> bool {
        if self.attendees.contains(&attendee) {
            return false;
        }
        self.attendees.push(attendee);
        true
    }

    /// Stores a meeting, registering any of its attendees not yet known.
    pub fn add_meeting(&mut self, meeting: Meeting) {
        for attendee in meeting.attendees() {
            self.add_attendee(attendee.clone());
        }
        self.meetings.push(meeting);
    }

    /// Returns all stored meetings in insertion order.
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    pub fn meeting_count(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty() && self.meetings.is_empty()
    }
}

impl MeetingRepository for InMemoryRepository {
    fn meetings_for(
        &self,
        attendees: &[Attendee],
        window: &TimeWindow,
    ) -> SlotResult<Vec<Meeting>> {
        Ok(self
            .meetings
            .iter()
            .filter(|m| m.involves_any(attendees) && m.intersects(window))
            .cloned()
            .collect())
    }

    fn all_meetings(&self) -> SlotResult<Vec<Meeting>> {
        Ok(self.meetings.clone())
    }
}

impl AttendeeDirectory for InMemoryRepository {
    fn find_by_names(&self, names: &[String]) -> SlotResult<Vec<Attendee>> {
        Ok(self
            .attendees
            .iter()
            .filter(|a| names.iter().any(|n| n == a.name()))
            .cloned()
            .collect())
    }

    fn attendees(&self) -> SlotResult<Vec<Attendee>> {
        Ok(self.attendees.clone())
    }
}

/// A repository that always returns an error.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct ErrorRepository {
    error: SlotError,
}

#[cfg(any(test, feature = "test-support"))]
impl ErrorRepository {
    /// Creates a repository failing with the given error.
    pub fn new(error: SlotError) -> Self {
        Self { error }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl MeetingRepository for ErrorRepository {
    fn meetings_for(
        &self,
        _attendees: &[Attendee],
        _window: &TimeWindow,
    ) -> SlotResult<Vec<Meeting>> {
        Err(self.error.clone())
    }

    fn all_meetings(&self) -> SlotResult<Vec<Meeting>> {
        Err(self.error.clone())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl AttendeeDirectory for ErrorRepository {
    fn find_by_names(&self, _names: &[String]) -> SlotResult<Vec<Attendee>> {
        Err(self.error.clone())
    }

    fn attendees(&self) -> SlotResult<Vec<Attendee>> {
        Err(self.error.clone())
    }
}
