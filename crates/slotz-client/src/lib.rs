//! CLI, config file, seed data, socket client
//!
//! This crate provides the `slotz` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod seed;
pub mod socket;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
pub use socket::SocketClient;
