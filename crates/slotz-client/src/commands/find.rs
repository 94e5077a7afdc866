//! Find command: ranked free slots, from the server or in-process.

use slotz_core::CandidateSlot;
use slotz_protocol::FindSlotsParams;
use slotz_server::ServerState;
use tracing::debug;

use crate::cli::{Cli, FindArgs};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::seed::load_repository;

pub async fn run(cli: &Cli, config: &ClientConfig, args: &FindArgs) -> ClientResult<()> {
    let params = params(args);

    let mut slots = if args.offline {
        search_offline(config, args, &params)?
    } else {
        super::client(cli, config).find_slots(params).await?
    };
    debug!(count = slots.len(), offline = args.offline, "slots found");

    if let Some(limit) = args.limit {
        slots.truncate(limit);
    }

    let output = if args.json {
        render_json(&slots)?
    } else {
        render_text(&slots)
    };
    println!("{}", output);
    Ok(())
}

fn params(args: &FindArgs) -> FindSlotsParams {
    FindSlotsParams {
        attendees: args.attendees.clone(),
        duration: args.duration,
        start_time: args.start.clone(),
        end_time: args.end.clone(),
    }
}

/// Runs the same lookup, search and ranking as the server against the
/// local seed data.
fn search_offline(
    config: &ClientConfig,
    args: &FindArgs,
    params: &FindSlotsParams,
) -> ClientResult<Vec<CandidateSlot>> {
    let hours = config.calendar.working_hours()?;
    let repository = load_repository(config, args.seed.as_deref())?;
    let state = ServerState::new(repository).with_working_hours(hours);
    Ok(state.find_slots(params)?)
}

/// One line per slot, best first.
pub fn render_text(slots: &[CandidateSlot]) -> String {
    if slots.is_empty() {
        return "No free slots".to_string();
    }

    slots
        .iter()
        .map(|slot| {
            let end = if slot.end_time.date_naive() == slot.start_time.date_naive() {
                slot.end_time.format("%H:%M")
            } else {
                slot.end_time.format("%Y-%m-%d %H:%M")
            };
            match slot.weight {
                Some(weight) => format!(
                    "{}-{} UTC  {:.4}",
                    slot.start_time.format("%Y-%m-%d %a %H:%M"),
                    end,
                    weight
                ),
                None => format!("{}-{} UTC", slot.start_time.format("%Y-%m-%d %a %H:%M"), end),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(slots: &[CandidateSlot]) -> ClientResult<String> {
    serde_json::to_string_pretty(slots)
        .map_err(|e| ClientError::Protocol(format!("failed to serialize slots: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn slot(h: u32, m: u32, minutes: i64) -> CandidateSlot {
        CandidateSlot::new(
            Utc.with_ymd_and_hms(2022, 6, 6, h, m, 0).unwrap(),
            Duration::minutes(minutes),
        )
    }

    fn args(offline: bool, seed: Option<std::path::PathBuf>) -> FindArgs {
        FindArgs {
            attendees: vec!["Ada".to_string()],
            duration: 3600,
            start: "2022-06-06T07:00:00Z".to_string(),
            end: "2022-06-06T09:15:00Z".to_string(),
            offline,
            seed,
            limit: None,
            json: false,
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn text() {
            let slots = vec![slot(7, 0, 60).with_weight(0.5), slot(23, 30, 60)];
            assert_eq!(
                render_text(&slots),
                "2022-06-06 Mon 07:00-08:00 UTC  0.5000\n\
                 2022-06-06 Mon 23:30-2022-06-07 00:30 UTC"
            );
        }

        #[test]
        fn empty() {
            assert_eq!(render_text(&[]), "No free slots");
            assert_eq!(render_json(&[]).unwrap(), "[]");
        }

        #[test]
        fn json_keeps_wire_shape() {
            let json = render_json(&[slot(7, 0, 60).with_weight(0.5)]).unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value[0]["start_time"], "2022-06-06T07:00:00Z");
            assert_eq!(value[0]["end_time"], "2022-06-06T08:00:00Z");
            assert_eq!(value[0]["weight"], 0.5);
        }
    }

    mod offline {
        use super::*;

        const SEED: &str = r#"
[[meetings]]
attendees = ["Ada"]
start_time = "2022-06-06T07:00:00Z"
end_time = "2022-06-06T08:00:00Z"

[[meetings]]
attendees = ["Ada"]
start_time = "2022-06-06T09:00:00Z"
end_time = "2022-06-06T10:00:00Z"
"#;

        #[test]
        fn uses_configured_calendar() {
            let dir = tempfile::tempdir().unwrap();
            let seed = dir.path().join("seed.toml");
            std::fs::write(&seed, SEED).unwrap();

            let mut config = ClientConfig::default();
            config.calendar.work_hours = "07:00-15:00".to_string();

            let args = args(true, Some(seed));
            let slots = search_offline(&config, &args, &params(&args)).unwrap();

            let starts: Vec<String> = slots
                .iter()
                .map(|s| s.start_time.format("%H:%M").to_string())
                .collect();
            // 08:15-09:15 overlaps the 09:00 meeting.
            assert_eq!(starts, vec!["08:00"]);
            assert_eq!(slots[0].weight, Some(0.5));
        }

        #[test]
        fn invalid_request_is_invalid_input() {
            let mut args = args(true, None);
            args.duration = 0;
            let result = search_offline(&ClientConfig::default(), &args, &params(&args));
            assert!(matches!(result, Err(ClientError::InvalidInput(_))));
        }
    }
}
