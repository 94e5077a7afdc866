//! Candidate slot generation and conflict filtering.
//!
//! The finder walks every business day touched by the search window, lays
//! out candidates of the requested duration inside that day's working
//! interval, then drops any candidate that collides with an attendee's
//! meeting or sticks out of the window. Output order is day ascending, then
//! start time ascending.

use chrono::{DateTime, Duration, Utc};

use crate::error::SlotResult;
use crate::model::{Attendee, CandidateSlot, Meeting};
use crate::repository::MeetingRepository;
use crate::search::SearchRequest;
use crate::time::{WorkingHours, is_business_day};

/// Finds conflict-free slots against a meeting repository.
#[derive(Debug)]
pub struct SlotFinder<'r, R: MeetingRepository + ?Sized> {
    repository: &'r R,
    hours: WorkingHours,
}

impl<'r, R: MeetingRepository + ?Sized> SlotFinder<'r, R> {
    /// Creates a finder using the default 09:00-17:00 UTC working day.
    pub fn new(repository: &'r R) -> Self {
        Self {
            repository,
            hours: WorkingHours::default(),
        }
    }

    /// Builder method to set the working calendar.
    pub fn with_working_hours(mut self, hours: WorkingHours) -> Self {
        self.hours = hours;
        self
    }

    /// The working calendar slots are generated from.
    pub fn working_hours(&self) -> &WorkingHours {
        &self.hours
    }

    /// Generates every candidate inside the working calendar, before any
    /// window or conflict filtering.
    ///
    /// Weekends are skipped. A candidate whose end would pass the end of the
    /// working day is not emitted and stops generation for that day.
    pub fn candidate_slots(&self, request: &SearchRequest) -> Vec<CandidateSlot> {
        let duration = request.duration();
        let step = self.hours.granularity();
        let mut slots = Vec::new();

        for date in request.window().dates().filter(|d| is_business_day(*d)) {
            let day = self.hours.for_date(date);
            let mut cursor = day.start;
            // Overflowing either addition ends the day.
            while let Some(end) = cursor
                .checked_add_signed(duration)
                .filter(|end| *end <= day.end)
            {
                slots.push(CandidateSlot {
                    start_time: cursor,
                    end_time: end,
                    weight: None,
                });
                match cursor.checked_add_signed(step) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }

        slots
    }

    /// Returns the conflict-free candidates for `request`, in generation order.
    ///
    /// The repository is queried once. Its errors are returned unchanged.
    #[tracing::instrument(
        skip(self, request),
        fields(
            attendees = request.attendees().len(),
            duration_s = request.duration().num_seconds(),
        )
    )]
    pub fn find_slots(&self, request: &SearchRequest) -> SlotResult<Vec<CandidateSlot>> {
        let window = request.window();
        let candidates = self.candidate_slots(request);
        let meetings = self
            .repository
            .meetings_for(request.attendees(), window)?;

        let generated = candidates.len();
        let kept: Vec<CandidateSlot> = candidates
            .into_iter()
            .filter(|slot| window.encloses(slot.start_time, slot.end_time))
            .filter(|slot| is_free(slot, &meetings))
            .collect();

        tracing::debug!(
            generated,
            meetings = meetings.len(),
            kept = kept.len(),
            "slot search complete"
        );
        Ok(kept)
    }
}

fn is_free(slot: &CandidateSlot, meetings: &[Meeting]) -> bool {
    !meetings.iter().any(|m| m.conflicts_with(slot))
}

/// Finds free slots with the default working calendar.
///
/// Validates the inputs into a [`SearchRequest`] first, so a non-positive
/// duration or an empty window is an invalid-request error.
pub fn find_slots<R: MeetingRepository + ?Sized>(
    repository: &R,
    attendees: &[Attendee],
    duration: Duration,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> SlotResult<Vec<CandidateSlot>> {
    let request = SearchRequest::new(attendees.to_vec(), duration, start_time, end_time)?;
    SlotFinder::new(repository).find_slots(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotError;
    use crate::repository::{ErrorRepository, InMemoryRepository};
    use chrono::{Datelike, TimeZone, Weekday};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn attendees(names: &[&str]) -> Vec<Attendee> {
        names.iter().map(|n| Attendee::new(*n)).collect()
    }

    fn meeting(names: &[&str], start: DateTime<Utc>, end: DateTime<Utc>) -> Meeting {
        Meeting::new(attendees(names), start, end).unwrap()
    }

    /// A 07:00-15:00 UTC working day, i.e. 09:00-17:00 for a team at UTC+2.
    fn early_hours() -> WorkingHours {
        WorkingHours::parse("07:00-15:00").unwrap()
    }

    fn request(
        names: &[&str],
        duration: Duration,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SearchRequest {
        SearchRequest::new(attendees(names), duration, start, end).unwrap()
    }

    fn week_request(duration: Duration) -> SearchRequest {
        // 2022-06-06 is a Monday
        request(
            &["Ada", "Grace"],
            duration,
            utc(2022, 6, 6, 0, 0, 0),
            utc(2022, 6, 12, 23, 59, 59),
        )
    }

    mod generation {
        use super::*;

        #[test]
        fn one_day_in_quarter_hours() {
            let repo = InMemoryRepository::new();
            let finder = SlotFinder::new(&repo);
            let slots = finder.candidate_slots(&request(
                &[],
                Duration::hours(1),
                utc(2022, 6, 6, 0, 0, 0),
                utc(2022, 6, 6, 23, 0, 0),
            ));

            // 09:00, 09:15, ..., 16:00
            assert_eq!(slots.len(), 29);
            assert_eq!(slots[0].start_time, utc(2022, 6, 6, 9, 0, 0));
            assert_eq!(slots[1].start_time, utc(2022, 6, 6, 9, 15, 0));
            assert_eq!(slots[28].end_time, utc(2022, 6, 6, 17, 0, 0));
        }

        #[test]
        fn weekends_are_skipped() {
            let repo = InMemoryRepository::new();
            let finder = SlotFinder::new(&repo);
            // Saturday and Sunday only
            let slots = finder.candidate_slots(&request(
                &[],
                Duration::hours(1),
                utc(2022, 6, 11, 0, 0, 0),
                utc(2022, 6, 12, 23, 0, 0),
            ));
            assert!(slots.is_empty());
        }

        #[test]
        fn duration_longer_than_working_day_yields_nothing() {
            let repo = InMemoryRepository::new();
            let finder = SlotFinder::new(&repo);
            let slots = finder.candidate_slots(&week_request(Duration::hours(9)));
            assert!(slots.is_empty());

            let slots = finder.candidate_slots(&week_request(Duration::hours(8)));
            assert_eq!(slots.len(), 5);
        }

        #[test]
        fn overflowing_duration_yields_nothing() {
            let repo = InMemoryRepository::new();
            let huge = Duration::try_seconds(10_000_000_000_000).unwrap();

            let slots = find_slots(
                &repo,
                &[],
                huge,
                utc(2022, 6, 6, 0, 0, 0),
                utc(2022, 6, 7, 0, 0, 0),
            )
            .unwrap();
            assert!(slots.is_empty());

            let slots = SlotFinder::new(&repo).candidate_slots(&week_request(Duration::MAX));
            assert!(slots.is_empty());
        }

        #[test]
        fn overflowing_step_ends_the_day() {
            let repo = InMemoryRepository::new();
            let hours = WorkingHours::default()
                .with_granularity(Duration::try_days(1_000_000_000).unwrap())
                .unwrap();
            let finder = SlotFinder::new(&repo).with_working_hours(hours);
            // One candidate per business day, then the step overflows or leaves the day.
            let slots = finder.candidate_slots(&week_request(Duration::hours(1)));
            assert_eq!(slots.len(), 5);
        }

        #[test]
        fn custom_granularity() {
            let repo = InMemoryRepository::new();
            let hours = WorkingHours::default()
                .with_granularity(Duration::minutes(30))
                .unwrap();
            let finder = SlotFinder::new(&repo).with_working_hours(hours);
            let slots = finder.candidate_slots(&request(
                &[],
                Duration::hours(1),
                utc(2022, 6, 6, 0, 0, 0),
                utc(2022, 6, 6, 23, 0, 0),
            ));
            // 09:00, 09:30, ..., 16:00
            assert_eq!(slots.len(), 15);
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn single_free_hour() {
            let repo = InMemoryRepository::new();
            let finder = SlotFinder::new(&repo).with_working_hours(early_hours());
            let slots = finder
                .find_slots(&request(
                    &["Ada", "Grace"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 7, 0, 0),
                    utc(2022, 6, 6, 8, 0, 0),
                ))
                .unwrap();

            assert_eq!(
                slots,
                vec![CandidateSlot::new(utc(2022, 6, 6, 7, 0, 0), Duration::hours(1))]
            );
        }

        #[test]
        fn early_window_is_outside_default_working_day() {
            let repo = InMemoryRepository::new();
            let slots = find_slots(
                &repo,
                &attendees(&["Ada"]),
                Duration::hours(1),
                utc(2022, 6, 6, 7, 0, 0),
                utc(2022, 6, 6, 8, 0, 0),
            )
            .unwrap();
            assert!(slots.is_empty());
        }

        #[test]
        fn free_week() {
            let repo = InMemoryRepository::new();
            let finder = SlotFinder::new(&repo);

            let hourly = finder.find_slots(&week_request(Duration::hours(1))).unwrap();
            assert_eq!(hourly.len(), 145);

            let half_hourly = finder
                .find_slots(&week_request(Duration::minutes(30)))
                .unwrap();
            assert_eq!(half_hourly.len(), 155);
        }

        #[test]
        fn daily_first_hour_meetings() {
            let mut repo = InMemoryRepository::new();
            for day in 6..=10 {
                repo.add_meeting(meeting(
                    &["Ada", "Grace"],
                    utc(2022, 6, day, 9, 0, 0),
                    utc(2022, 6, day, 10, 0, 0),
                ));
            }
            let finder = SlotFinder::new(&repo);

            let slots = finder.find_slots(&week_request(Duration::hours(1))).unwrap();
            assert_eq!(slots.len(), 125);
            assert_eq!(slots[0].start_time, utc(2022, 6, 6, 10, 0, 0));

            let blocked = finder
                .find_slots(&request(
                    &["Ada"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 9, 0, 0),
                    utc(2022, 6, 6, 10, 0, 0),
                ))
                .unwrap();
            assert!(blocked.is_empty());
        }

        #[test]
        fn first_hour_blocked_on_early_calendar() {
            let mut repo = InMemoryRepository::new();
            repo.add_meeting(meeting(
                &["Ada"],
                utc(2022, 6, 6, 7, 0, 0),
                utc(2022, 6, 6, 8, 0, 0),
            ));
            let finder = SlotFinder::new(&repo).with_working_hours(early_hours());
            let slots = finder
                .find_slots(&request(
                    &["Ada"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 7, 0, 0),
                    utc(2022, 6, 6, 8, 0, 0),
                ))
                .unwrap();
            assert!(slots.is_empty());
        }

        #[test]
        fn separate_attendee_meetings() {
            let mut repo = InMemoryRepository::new();
            repo.add_meeting(meeting(
                &["attendee1"],
                utc(2022, 6, 6, 7, 0, 0),
                utc(2022, 6, 6, 8, 0, 0),
            ));
            repo.add_meeting(meeting(
                &["attendee2"],
                utc(2022, 6, 6, 7, 0, 0),
                utc(2022, 6, 6, 7, 30, 0),
            ));
            repo.add_meeting(meeting(
                &["attendee1"],
                utc(2022, 6, 6, 11, 0, 0),
                utc(2022, 6, 6, 12, 0, 0),
            ));
            repo.add_meeting(meeting(
                &["attendee2"],
                utc(2022, 6, 6, 12, 0, 0),
                utc(2022, 6, 6, 12, 30, 0),
            ));
            let finder = SlotFinder::new(&repo).with_working_hours(early_hours());

            let slots = finder
                .find_slots(&request(
                    &["attendee1", "attendee2"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 7, 0, 0),
                    utc(2022, 6, 6, 9, 15, 0),
                ))
                .unwrap();

            let starts: Vec<_> = slots.iter().map(|s| s.start_time).collect();
            assert_eq!(
                starts,
                vec![utc(2022, 6, 6, 8, 0, 0), utc(2022, 6, 6, 8, 15, 0)]
            );
        }

        #[test]
        fn back_to_back_meetings_fill_window() {
            let mut repo = InMemoryRepository::new();
            repo.add_meeting(meeting(
                &["attendee1"],
                utc(2022, 6, 6, 9, 0, 0),
                utc(2022, 6, 6, 10, 0, 0),
            ));
            repo.add_meeting(meeting(
                &["attendee2"],
                utc(2022, 6, 6, 10, 0, 0),
                utc(2022, 6, 6, 10, 30, 0),
            ));
            let finder = SlotFinder::new(&repo);
            let slots = finder
                .find_slots(&request(
                    &["attendee1", "attendee2"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 9, 0, 0),
                    utc(2022, 6, 6, 10, 30, 0),
                ))
                .unwrap();
            assert!(slots.is_empty());
        }

        #[test]
        fn touching_meetings_do_not_conflict() {
            let mut repo = InMemoryRepository::new();
            repo.add_meeting(meeting(
                &["Ada"],
                utc(2022, 6, 6, 9, 0, 0),
                utc(2022, 6, 6, 10, 0, 0),
            ));
            let finder = SlotFinder::new(&repo);
            let slots = finder
                .find_slots(&request(
                    &["Ada"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 10, 0, 0),
                    utc(2022, 6, 6, 11, 0, 0),
                ))
                .unwrap();
            assert_eq!(slots.len(), 1);
        }

        #[test]
        fn other_attendees_meetings_are_ignored() {
            let mut repo = InMemoryRepository::new();
            repo.add_meeting(meeting(
                &["Linus"],
                utc(2022, 6, 6, 9, 0, 0),
                utc(2022, 6, 6, 17, 0, 0),
            ));
            let finder = SlotFinder::new(&repo);
            let slots = finder
                .find_slots(&request(
                    &["Ada"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 0, 0, 0),
                    utc(2022, 6, 6, 23, 0, 0),
                ))
                .unwrap();
            assert_eq!(slots.len(), 29);
        }

        #[test]
        fn meeting_straddling_window_start_still_blocks() {
            let mut repo = InMemoryRepository::new();
            repo.add_meeting(meeting(
                &["Ada"],
                utc(2022, 6, 6, 8, 0, 0),
                utc(2022, 6, 6, 10, 0, 0),
            ));
            let finder = SlotFinder::new(&repo);
            let slots = finder
                .find_slots(&request(
                    &["Ada"],
                    Duration::hours(1),
                    utc(2022, 6, 6, 9, 0, 0),
                    utc(2022, 6, 6, 11, 0, 0),
                ))
                .unwrap();
            assert_eq!(
                slots,
                vec![CandidateSlot::new(utc(2022, 6, 6, 10, 0, 0), Duration::hours(1))]
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn repository_error_propagates() {
            let repo = ErrorRepository::new(SlotError::repository("store offline"));
            let result = SlotFinder::new(&repo).find_slots(&week_request(Duration::hours(1)));
            assert_eq!(result, Err(SlotError::repository("store offline")));
        }

        #[test]
        fn invalid_inputs_are_rejected_before_lookup() {
            let repo = ErrorRepository::new(SlotError::repository("unreachable"));
            let result = find_slots(
                &repo,
                &[],
                Duration::zero(),
                utc(2022, 6, 6, 9, 0, 0),
                utc(2022, 6, 6, 17, 0, 0),
            );
            assert!(matches!(result, Err(SlotError::InvalidRequest(_))));

            let result = find_slots(
                &repo,
                &[],
                Duration::hours(1),
                utc(2022, 6, 6, 17, 0, 0),
                utc(2022, 6, 6, 9, 0, 0),
            );
            assert!(matches!(result, Err(SlotError::InvalidRequest(_))));
        }

        #[test]
        fn works_through_trait_object() {
            let repo: Box<dyn MeetingRepository> = Box::new(InMemoryRepository::new());
            let slots = SlotFinder::new(repo.as_ref())
                .find_slots(&week_request(Duration::hours(1)))
                .unwrap();
            assert_eq!(slots.len(), 145);
        }
    }

    mod properties {
        use super::*;
        use crate::time::TimeWindow;
        use proptest::prelude::*;

        const WEEK_QUARTERS: i64 = 7 * 24 * 4;

        fn monday() -> DateTime<Utc> {
            utc(2022, 6, 6, 0, 0, 0)
        }

        fn quarters(n: i64) -> Duration {
            Duration::minutes(15 * n)
        }

        fn repo_from(busy: &[(usize, i64, i64)]) -> InMemoryRepository {
            let names = ["Ada", "Grace", "Linus"];
            let mut repo = InMemoryRepository::new();
            for &(who, offset, len) in busy {
                let start = monday() + quarters(offset);
                repo.add_meeting(meeting(&[names[who]], start, start + quarters(len)));
            }
            repo
        }

        proptest! {
            #[test]
            fn prop_kept_slots_are_free_and_inside_window(
                busy in prop::collection::vec((0usize..3, 0..WEEK_QUARTERS, 1i64..16), 0..12),
                from in 0..WEEK_QUARTERS,
                span in 1i64..WEEK_QUARTERS,
                len in 1i64..12,
                minute_jitter in 0i64..15,
            ) {
                let repo = repo_from(&busy);
                let start = monday() + quarters(from) + Duration::minutes(minute_jitter);
                let end = start + quarters(span);
                let duration = quarters(len);
                let req = request(&["Ada", "Grace"], duration, start, end);

                let slots = SlotFinder::new(&repo).find_slots(&req).unwrap();
                let window = TimeWindow::new(start, end);
                let requested = attendees(&["Ada", "Grace"]);

                for slot in &slots {
                    prop_assert_eq!(slot.end_time - slot.start_time, duration);
                    prop_assert!(window.encloses(slot.start_time, slot.end_time));
                    prop_assert!(slot.weight.is_none());
                    for m in repo.meetings().iter().filter(|m| m.involves_any(&requested)) {
                        prop_assert!(!m.conflicts_with(slot));
                    }
                }
                for pair in slots.windows(2) {
                    prop_assert!(pair[0].start_time < pair[1].start_time);
                }
            }

            #[test]
            fn prop_candidates_stay_in_working_hours(
                from in 0..WEEK_QUARTERS * 2,
                span in 1i64..WEEK_QUARTERS * 2,
                len in 1i64..40,
            ) {
                let repo = InMemoryRepository::new();
                let start = monday() + quarters(from);
                let req = request(&[], quarters(len), start, start + quarters(span));
                let finder = SlotFinder::new(&repo);

                for slot in finder.candidate_slots(&req) {
                    let date = slot.start_time.date_naive();
                    prop_assert!(!matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
                    let day = finder.working_hours().for_date(date);
                    prop_assert!(day.encloses(slot.start_time, slot.end_time));
                }
            }
        }
    }
}
