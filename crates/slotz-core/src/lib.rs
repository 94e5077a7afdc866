//! Core types: attendees, meetings, working calendar, slot finder and classifier
//!
//! ```ignore
//! use slotz_core::{InMemoryRepository, SearchRequest, SlotFinder, classify};
//!
//! let repo = InMemoryRepository::new();
//! let request = SearchRequest::new(attendees, duration, start, end)?;
//! let ranked = classify(SlotFinder::new(&repo).find_slots(&request)?);
//! ```

pub mod classifier;
pub mod error;
pub mod finder;
pub mod model;
pub mod repository;
pub mod search;
pub mod time;
pub mod tracing;

pub use classifier::{FOCUS_TIME_RANK, FocusTime, SlotClassifier, classify};
pub use error::{SlotError, SlotResult};
pub use finder::{SlotFinder, find_slots};
pub use model::{Attendee, CandidateSlot, Meeting};
pub use repository::{AttendeeDirectory, InMemoryRepository, MeetingRepository, Repository};
#[cfg(any(test, feature = "test-support"))]
pub use repository::ErrorRepository;
pub use search::SearchRequest;
pub use time::{TimeWindow, WorkingHours, is_business_day, minutes_since_midnight};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
