//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::seed::SeedData;

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the working calendar and, if configured, the seed data.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let hours = config.calendar.working_hours()?;
    println!(
        "Working hours {}-{} UTC, {} minute steps.",
        hours.start().format("%H:%M"),
        hours.end().format("%H:%M"),
        hours.granularity().num_minutes()
    );

    if let Some(ref path) = config.seed_file {
        let repo = SeedData::load(path)?.into_repository()?;
        println!(
            "Seed data is valid: {} attendees, {} meetings.",
            repo.attendee_count(),
            repo.meeting_count()
        );
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
