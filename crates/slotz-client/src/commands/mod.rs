//! Subcommand implementations.

pub mod config;
pub mod find;
pub mod listing;
pub mod serve;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::socket::SocketClient;

/// Builds the socket client from CLI overrides and the config file.
pub fn client(cli: &Cli, config: &ClientConfig) -> SocketClient {
    SocketClient::new(
        config.socket_path(cli.socket_path.as_deref()),
        config.timeout(cli.timeout),
    )
}
