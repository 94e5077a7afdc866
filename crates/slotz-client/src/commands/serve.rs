//! Serve command: runs the slot search server in the foreground.
//!
//! Loads seed data into an in-memory repository, binds the Unix socket and
//! answers requests until SIGTERM/SIGINT or a `shutdown` request.

use std::path::Path;

use tracing::info;

use slotz_server::{
    RequestHandler, ServerConfig, ServerState, SignalHandler, SocketServer,
    make_connection_handler, new_shared_state,
};

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::seed::load_repository;

/// Starts the server and blocks until it is told to stop.
pub async fn run(
    cli: &Cli,
    config: &ClientConfig,
    seed: Option<&Path>,
    max_connections: Option<usize>,
) -> ClientResult<()> {
    let hours = config.calendar.working_hours()?;
    let repository = load_repository(config, seed)?;

    let signal_handler = SignalHandler::new();
    signal_handler.spawn_listener();

    let state = new_shared_state(ServerState::new(repository).with_working_hours(hours));
    let handler = RequestHandler::new(state).with_shutdown_handle(signal_handler.shutdown_handle());

    let socket_path = config.socket_path(cli.socket_path.as_deref());
    let mut server_config = ServerConfig::new(&socket_path);
    if let Some(max) = max_connections {
        server_config = server_config.with_max_connections(max);
    }

    let server = SocketServer::new(server_config)
        .await
        .map_err(|e| ClientError::Config(format!("failed to start socket server: {}", e)))?;

    info!(
        path = %socket_path.display(),
        work_start = %hours.start().format("%H:%M"),
        work_end = %hours.end().format("%H:%M"),
        granularity_minutes = hours.granularity().num_minutes(),
        "Server listening"
    );

    server
        .run_until_shutdown(
            make_connection_handler(handler),
            signal_handler.shutdown().wait(),
        )
        .await
        .map_err(|e| ClientError::Config(format!("server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}
