//! Slot search server: request handling, Unix socket listener, shutdown.
//!
//! The server owns a meeting repository, a working calendar and a
//! classifier, and answers `find_slots` requests over the slotz protocol.
//!
//! # Example
//!
//! ```rust,no_run
//! use slotz_core::InMemoryRepository;
//! use slotz_server::{
//!     RequestHandler, ServerConfig, ServerState, SignalHandler, SocketServer,
//!     make_connection_handler, new_shared_state,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let signals = SignalHandler::new();
//!     signals.spawn_listener();
//!
//!     let state = new_shared_state(ServerState::new(InMemoryRepository::new()));
//!     let handler = RequestHandler::new(state).with_shutdown_handle(signals.shutdown_handle());
//!
//!     let server = SocketServer::new(ServerConfig::default()).await?;
//!     server
//!         .run_until_shutdown(make_connection_handler(handler), signals.shutdown().wait())
//!         .await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod handler;
mod signals;
mod socket;

pub use config::{ServerConfig, default_socket_path};
pub use error::{ServerError, ServerResult};
pub use handler::{
    RequestHandler, ServerState, SharedState, make_connection_handler, new_shared_state,
};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
pub use socket::{Connection, SocketServer};
