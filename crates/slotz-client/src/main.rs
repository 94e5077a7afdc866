//! slotz CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use slotz_core::{TracingConfig, init_tracing};

use slotz_client::cli::{Cli, Command, ConfigAction};
use slotz_client::commands;
use slotz_client::config::ClientConfig;
use slotz_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else if matches!(cli.command, Command::Serve { .. }) {
        TracingConfig::daemon()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
}

async fn run(cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    match cli.command {
        Command::Serve {
            ref seed,
            max_connections,
        } => commands::serve::run(cli, config, seed.as_deref(), max_connections).await,
        Command::Ping => commands::listing::ping(cli, config).await,
        Command::Stop => commands::listing::stop(cli, config).await,
        Command::Attendees => commands::listing::attendees(cli, config).await,
        Command::Meetings => commands::listing::meetings(cli, config).await,
        Command::Find(ref args) => commands::find::run(cli, config, args).await,
        Command::Config { ref action } => match action {
            ConfigAction::Dump => commands::config::dump(config),
            ConfigAction::Validate => commands::config::validate(config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
