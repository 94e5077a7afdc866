//! Server queries: ping, stop, attendee and meeting listings.

use slotz_core::Meeting;
use slotz_protocol::Response;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub async fn ping(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let client = super::client(cli, config);
    match client.call(slotz_protocol::Request::Ping).await? {
        Response::Pong { message } => {
            println!("{}", message);
            Ok(())
        }
        other => Err(ClientError::Protocol(format!(
            "expected pong response, got {:?}",
            other
        ))),
    }
}

pub async fn stop(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    super::client(cli, config).shutdown().await?;
    println!("Server is shutting down.");
    Ok(())
}

pub async fn attendees(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let attendees = super::client(cli, config).attendees().await?;
    if attendees.is_empty() {
        println!("No attendees");
    }
    for attendee in attendees {
        println!("{}", attendee);
    }
    Ok(())
}

pub async fn meetings(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let meetings = super::client(cli, config).meetings().await?;
    if meetings.is_empty() {
        println!("No meetings");
    }
    for meeting in &meetings {
        println!("{}", render_meeting(meeting));
    }
    Ok(())
}

fn render_meeting(meeting: &Meeting) -> String {
    let names: Vec<&str> = meeting.attendees().iter().map(|a| a.name()).collect();
    format!(
        "{} - {}  {}",
        meeting.start_time().format("%Y-%m-%d %a %H:%M"),
        meeting.end_time().format("%Y-%m-%d %H:%M"),
        names.join(", ")
    )
}
