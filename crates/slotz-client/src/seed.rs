//! Seed data for the in-memory repository.
//!
//! ```toml
//! [[attendees]]
//! name = "Ada"
//!
//! [[meetings]]
//! attendees = ["Ada", "Grace"]
//! start_time = "2022-06-06T09:00:00Z"
//! end_time = "2022-06-06T10:00:00Z"
//! ```
//!
//! Meetings may name attendees missing from `[[attendees]]`; they are
//! registered implicitly.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use slotz_core::{Attendee, InMemoryRepository, Meeting};
use slotz_protocol::parse_timestamp;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Parsed contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub attendees: Vec<SeedAttendee>,
    pub meetings: Vec<SeedMeeting>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAttendee {
    pub name: String,
}

/// A meeting as written in the seed file. Timestamps are RFC 3339 strings
/// with any offset.
#[derive(Debug, Deserialize)]
pub struct SeedMeeting {
    pub attendees: Vec<String>,
    pub start_time: String,
    pub end_time: String,
}

impl SeedData {
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::Config(format!("failed to parse seed data: {}", e)))
    }

    pub fn load(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read seed file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Builds a repository. The first invalid meeting aborts with a
    /// config error naming its position.
    pub fn into_repository(self) -> ClientResult<InMemoryRepository> {
        let mut repo = InMemoryRepository::new();

        for attendee in self.attendees {
            if !repo.add_attendee(Attendee::new(attendee.name.clone())) {
                debug!(name = %attendee.name, "Duplicate attendee in seed data");
            }
        }

        for (index, meeting) in self.meetings.into_iter().enumerate() {
            let meeting = meeting.into_meeting().map_err(|e| {
                ClientError::Config(format!("seed meeting #{}: {}", index + 1, e))
            })?;
            repo.add_meeting(meeting);
        }

        Ok(repo)
    }
}

impl SeedMeeting {
    fn into_meeting(self) -> slotz_core::SlotResult<Meeting> {
        let start = parse_timestamp("start_time", &self.start_time)?;
        let end = parse_timestamp("end_time", &self.end_time)?;
        let attendees = self.attendees.into_iter().map(Attendee::new).collect();
        Meeting::new(attendees, start, end)
    }
}

/// Loads the repository named by `seed_override` or `config.seed_file`.
///
/// Without either, the repository starts empty.
pub fn load_repository(
    config: &ClientConfig,
    seed_override: Option<&Path>,
) -> ClientResult<InMemoryRepository> {
    let Some(path) = seed_override.or(config.seed_file.as_deref()) else {
        info!("No seed file configured, starting with an empty repository");
        return Ok(InMemoryRepository::new());
    };

    let repo = SeedData::load(path)?.into_repository()?;
    info!(
        path = %path.display(),
        attendees = repo.attendee_count(),
        meetings = repo.meeting_count(),
        "Loaded seed data"
    );
    Ok(repo)
}
