//! Unix socket client for talking to `slotz serve`.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{debug, warn};
use uuid::Uuid;

use slotz_core::{Attendee, CandidateSlot, Meeting};
use slotz_protocol::{
    Envelope, FindSlotsParams, Request, Response, decode_message, encode_message, read_frame_len,
};

use crate::error::{ClientError, ClientResult};

/// Client for the slotz server.
pub struct SocketClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    /// Sends a request and waits for the response.
    ///
    /// Error responses are returned as `Ok`; see [`call`](Self::call) for
    /// the variant that turns them into [`ClientError::Server`].
    pub async fn send(&self, request: Request) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let envelope = Envelope::request(&request_id, request);

        debug!(
            socket = %self.socket_path.display(),
            request_id = %request_id,
            request_type = envelope.payload.kind(),
            "connecting to server"
        );

        let stream = tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| {
                ClientError::Connection(format!(
                    "connection timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ClientError::Connection(format!(
                    "failed to connect to {}: {} (is `slotz serve` running?)",
                    self.socket_path.display(),
                    e
                ))
            })?;

        let response = self.exchange(stream, &envelope).await?;

        if response.request_id != request_id {
            warn!(
                expected = %request_id,
                received = %response.request_id,
                "response request_id mismatch"
            );
        }

        Ok(response.payload)
    }

    /// Like [`send`](Self::send), but error responses become errors.
    pub async fn call(&self, request: Request) -> ClientResult<Response> {
        match self.send(request).await? {
            Response::Error { error } => Err(ClientError::Server(error)),
            response => Ok(response),
        }
    }

    /// Performs the framed request-response exchange on a connected stream.
    async fn exchange(
        &self,
        mut stream: UnixStream,
        envelope: &Envelope<Request>,
    ) -> ClientResult<Envelope<Response>> {
        let request = encode_message(envelope)?;

        tokio::time::timeout(self.timeout, async {
            stream.write_all(&request).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| ClientError::Timeout("sending request".into()))??;

        debug!("request sent, waiting for response");

        let frame = tokio::time::timeout(self.timeout, async {
            let mut prefix = [0u8; 4];
            stream.read_exact(&mut prefix).await?;
            let len = read_frame_len(prefix)?;

            let mut frame = Vec::with_capacity(4 + len);
            frame.extend_from_slice(&prefix);
            frame.resize(4 + len, 0);
            stream.read_exact(&mut frame[4..]).await?;
            Ok::<_, ClientError>(frame)
        })
        .await
        .map_err(|_| ClientError::Timeout("reading response".into()))??;

        let envelope: Envelope<Response> = decode_message(&frame)?;
        debug!(request_id = %envelope.request_id, "response received");
        Ok(envelope)
    }

    /// Returns true if the server answers a ping.
    pub async fn ping(&self) -> bool {
        matches!(self.send(Request::Ping).await, Ok(Response::Pong { .. }))
    }

    pub async fn attendees(&self) -> ClientResult<Vec<Attendee>> {
        match self.call(Request::ListAttendees).await? {
            Response::Attendees { attendees } => Ok(attendees),
            other => Err(unexpected("attendees", &other)),
        }
    }

    pub async fn meetings(&self) -> ClientResult<Vec<Meeting>> {
        match self.call(Request::ListMeetings).await? {
            Response::Meetings { meetings } => Ok(meetings),
            other => Err(unexpected("meetings", &other)),
        }
    }

    /// Runs a slot search on the server. Slots come back ranked.
    pub async fn find_slots(&self, params: FindSlotsParams) -> ClientResult<Vec<CandidateSlot>> {
        match self.call(Request::find_slots(params)).await? {
            Response::Slots { slots } => Ok(slots),
            other => Err(unexpected("slots", &other)),
        }
    }

    /// Asks the server to stop.
    pub async fn shutdown(&self) -> ClientResult<()> {
        match self.call(Request::Shutdown).await? {
            Response::Ok => Ok(()),
            other => Err(unexpected("ok", &other)),
        }
    }
}

fn unexpected(expected: &str, response: &Response) -> ClientError {
    ClientError::Protocol(format!(
        "expected {} response, got {:?}",
        expected, response
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use chrono::{TimeZone, Utc};
    use slotz_core::InMemoryRepository;
    use slotz_protocol::ErrorCode;
    use slotz_server::{
        RequestHandler, ServerConfig, ServerState, SignalHandler, SocketServer,
        make_connection_handler, new_shared_state,
    };
    use tempfile::TempDir;

    /// Starts a server on a temp socket; it stops on `shutdown` or when the
    /// runtime ends.
    async fn spawn_server(repo: InMemoryRepository) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("slotz.sock");

        let signals = SignalHandler::new();
        let handler = RequestHandler::new(new_shared_state(ServerState::new(repo)))
            .with_shutdown_handle(signals.shutdown_handle());
        let server = SocketServer::new(ServerConfig::new(&socket_path))
            .await
            .unwrap();
        tokio::spawn(async move {
            let shutdown = signals.shutdown();
            let _ = server
                .run_until_shutdown(make_connection_handler(handler), shutdown.wait())
                .await;
        });

        (dir, socket_path)
    }

    fn client(path: &Path) -> SocketClient {
        SocketClient::new(path, Duration::from_secs(2))
    }

    #[tokio::test]
    async fn missing_server_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = client(&dir.path().join("nobody.sock"));
        assert!(!client.ping().await);
        assert!(matches!(
            client.attendees().await,
            Err(ClientError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn talks_to_server() {
        let mut repo = InMemoryRepository::new();
        repo.add_meeting(
            Meeting::new(
                vec![Attendee::new("Ada")],
                Utc.with_ymd_and_hms(2022, 6, 6, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2022, 6, 6, 10, 0, 0).unwrap(),
            )
            .unwrap(),
        );
        let (_dir, socket_path) = spawn_server(repo).await;
        let client = client(&socket_path);

        assert!(client.ping().await);
        assert_eq!(client.attendees().await.unwrap(), vec![Attendee::new("Ada")]);
        assert_eq!(client.meetings().await.unwrap().len(), 1);

        let slots = client
            .find_slots(FindSlotsParams::new(
                vec!["Ada".to_string()],
                chrono::Duration::minutes(30),
                Utc.with_ymd_and_hms(2022, 6, 6, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2022, 6, 6, 11, 0, 0).unwrap(),
            ))
            .await
            .unwrap();
        // 10:00, 10:15, 10:30
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(CandidateSlot::is_weighted));

        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn server_errors_surface_as_client_errors() {
        let (_dir, socket_path) = spawn_server(InMemoryRepository::new()).await;
        let client = client(&socket_path);

        let params = FindSlotsParams {
            attendees: vec![],
            duration: 0,
            start_time: "2022-06-06T09:00:00Z".to_string(),
            end_time: "2022-06-06T10:00:00Z".to_string(),
        };
        match client.find_slots(params).await {
            Err(ClientError::Server(error)) => assert_eq!(error.code, ErrorCode::InvalidRequest),
            other => panic!("unexpected result: {other:?}"),
        }

        // `send` hands error responses back untouched.
        let response = client
            .send(Request::find_slots(FindSlotsParams {
                attendees: vec![],
                duration: 60,
                start_time: "later".to_string(),
                end_time: "2022-06-06T10:00:00Z".to_string(),
            }))
            .await
            .unwrap();
        assert!(!response.is_success());
    }
}
