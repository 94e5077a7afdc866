//! Unix socket listener.
//!
//! One task per accepted connection, bounded by a semaphore sized from
//! [`ServerConfig::max_connections`].

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use slotz_protocol::{
    Envelope, ErrorCode, ProtocolError, Request, Response, encode_message, read_frame_len,
};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Unix socket server for handling client connections.
pub struct SocketServer {
    config: ServerConfig,
    listener: UnixListener,
    connection_semaphore: Arc<Semaphore>,
}

impl SocketServer {
    /// Binds to `config.socket_path`.
    ///
    /// A leftover socket file is removed when `cleanup_stale_socket` is set
    /// and nothing answers on it. A live socket is never taken over.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        if config.connection_timeout.is_zero() {
            return Err(ServerError::config("connection timeout must be positive"));
        }

        let socket_path = &config.socket_path;

        if let Some(parent) = socket_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(ServerError::socket_path_invalid(
                parent.to_string_lossy().to_string(),
            ));
        }

        if socket_path.exists() {
            if !config.cleanup_stale_socket {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            if UnixStream::connect(socket_path).await.is_ok() {
                return Err(ServerError::socket_in_use(
                    socket_path.to_string_lossy().to_string(),
                ));
            }
            info!(path = %socket_path.display(), "Removing stale socket");
            std::fs::remove_file(socket_path)?;
        }

        let listener = UnixListener::bind(socket_path)?;
        info!(
            path = %socket_path.display(),
            max_connections = config.max_connections,
            "Socket server listening"
        );

        let connection_semaphore = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            config,
            listener,
            connection_semaphore,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Waits for a free connection slot, then accepts one client.
    pub async fn accept(&self) -> ServerResult<Connection> {
        let permit = self
            .connection_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ServerError::Shutdown)?;

        let (stream, _addr) = self.listener.accept().await?;
        debug!("Accepted new connection");

        Ok(Connection {
            stream,
            timeout: self.config.connection_timeout,
            _permit: permit,
        })
    }

    /// Runs the accept loop forever, spawning `handler` per connection.
    pub async fn run<F, Fut>(&self, handler: F) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        loop {
            match self.accept().await {
                Ok(connection) => {
                    tokio::spawn(handler(connection));
                }
                Err(ServerError::Shutdown) => return Ok(()),
                Err(e) => error!(error = %e, "Failed to accept connection"),
            }
        }
    }

    /// Runs the accept loop until `shutdown` completes.
    pub async fn run_until_shutdown<F, Fut, S>(&self, handler: F, shutdown: S) -> ServerResult<()>
    where
        F: Fn(Connection) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        S: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.run(handler) => result,
            _ = shutdown => {
                info!("Shutdown signal received");
                Ok(())
            }
        }
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        if !self.config.socket_path.exists() {
            return;
        }
        match std::fs::remove_file(&self.config.socket_path) {
            Ok(()) => debug!(path = %self.config.socket_path.display(), "Removed socket file"),
            Err(e) => warn!(
                path = %self.config.socket_path.display(),
                error = %e,
                "Failed to remove socket file"
            ),
        }
    }
}

/// A client connection. Holds a connection slot until dropped.
pub struct Connection {
    stream: UnixStream,
    timeout: Duration,
    _permit: OwnedSemaphorePermit,
}

impl Connection {
    /// Reads a request envelope.
    ///
    /// Returns `Ok(None)` if the client closed the connection between
    /// messages.
    pub async fn read_request(&mut self) -> ServerResult<Option<Envelope<Request>>> {
        let mut prefix = [0u8; 4];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut prefix)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ProtocolError::timeout("read request length").into()),
        }

        let len = read_frame_len(prefix)?;

        let mut payload = vec![0u8; len];
        match tokio::time::timeout(self.timeout, self.stream.read_exact(&mut payload)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ProtocolError::timeout("read request payload").into()),
        }

        let envelope: Envelope<Request> =
            serde_json::from_slice(&payload).map_err(ProtocolError::from)?;
        Ok(Some(envelope))
    }

    /// Writes a response envelope.
    pub async fn write_response(&mut self, envelope: &Envelope<Response>) -> ServerResult<()> {
        let buffer = encode_message(envelope)?;
        match tokio::time::timeout(self.timeout, self.stream.write_all(&buffer)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ProtocolError::timeout("write response").into()),
        }
    }

    /// Sends `response` tagged with `request_id`.
    ///
    /// A response over the frame size limit is replaced by a
    /// `response_too_large` error so the client still gets an answer.
    pub async fn respond(
        &mut self,
        request_id: impl Into<String>,
        response: Response,
    ) -> ServerResult<()> {
        let request_id = request_id.into();
        let envelope = Envelope::response(request_id.clone(), response);
        match self.write_response(&envelope).await {
            Err(ServerError::Protocol(ProtocolError::MessageTooLarge { size, max })) => {
                warn!(size, max, "Response too large, replying with an error");
                let error = Response::error(
                    ErrorCode::ResponseTooLarge,
                    format!(
                        "response of {} bytes exceeds the {} byte limit, narrow the search window",
                        size, max
                    ),
                );
                self.write_response(&Envelope::response(request_id, error))
                    .await
            }
            other => other,
        }
    }
}
