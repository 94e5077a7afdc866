//! Request/response dispatch handler.
//!
//! The handler is the request boundary of the slot engine: it resolves
//! attendee names, validates the search parameters, runs the finder and the
//! classifier, and maps every failure onto a protocol error code.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::{Span, debug, info, warn};

use slotz_core::{
    CandidateSlot, InMemoryRepository, Repository, SlotClassifier, SlotFinder, SlotResult,
    WorkingHours,
};
use slotz_protocol::{
    ErrorCode, ErrorResponse, FindSlotsParams, PROTOCOL_VERSION, Request, Response,
};

use crate::error::{ServerError, ServerResult};
use crate::signals::ShutdownHandle;
use crate::socket::Connection;

/// Server state shared across all connections.
pub struct ServerState {
    repository: Box<dyn Repository>,
    hours: WorkingHours,
    classifier: SlotClassifier,
    shutdown_requested: bool,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(InMemoryRepository::new())
    }
}

impl ServerState {
    /// Creates a state serving the given repository with the default
    /// working calendar and focus window.
    pub fn new(repository: impl Repository + 'static) -> Self {
        Self {
            repository: Box::new(repository),
            hours: WorkingHours::default(),
            classifier: SlotClassifier::default(),
            shutdown_requested: false,
        }
    }

    /// Builder: set the working calendar used for slot generation.
    pub fn with_working_hours(mut self, hours: WorkingHours) -> Self {
        self.hours = hours;
        self
    }

    /// Builder: set the classifier used for ranking.
    pub fn with_classifier(mut self, classifier: SlotClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn working_hours(&self) -> &WorkingHours {
        &self.hours
    }

    /// Resolves attendees, then finds and ranks slots.
    ///
    /// Unknown attendee names are dropped, not reported.
    pub fn find_slots(&self, params: &FindSlotsParams) -> SlotResult<Vec<CandidateSlot>> {
        let attendees = self.repository.find_by_names(&params.attendees)?;
        if attendees.len() < params.attendees.len() {
            debug!(
                requested = params.attendees.len(),
                resolved = attendees.len(),
                "Ignoring unknown attendees"
            );
        }
        let request = params.to_search_request(attendees)?;
        let slots = SlotFinder::new(self.repository.as_ref())
            .with_working_hours(self.hours)
            .find_slots(&request)?;
        Ok(self.classifier.classify(slots))
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("hours", &self.hours)
            .field("classifier", &self.classifier)
            .field("shutdown_requested", &self.shutdown_requested)
            .finish_non_exhaustive()
    }
}

/// Shared server state wrapped in an Arc<RwLock>.
pub type SharedState = Arc<RwLock<ServerState>>;

/// Wraps a state for sharing across connections.
pub fn new_shared_state(state: ServerState) -> SharedState {
    Arc::new(RwLock::new(state))
}

/// Request handler that processes incoming requests and produces responses.
#[derive(Clone)]
pub struct RequestHandler {
    state: SharedState,
    shutdown: Option<ShutdownHandle>,
}

impl RequestHandler {
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            shutdown: None,
        }
    }

    /// Builder: stop the server through `handle` on a `shutdown` request.
    pub fn with_shutdown_handle(mut self, handle: ShutdownHandle) -> Self {
        self.shutdown = Some(handle);
        self
    }

    /// Handles a single request and returns the response.
    #[tracing::instrument(skip(self, request), fields(request_type = request.kind(), duration_ms))]
    pub async fn handle(&self, request: &Request) -> Response {
        let start = Instant::now();
        let shutting_down = self.state.read().await.shutdown_requested();

        let response = match request {
            Request::Ping => Response::pong(),
            Request::Shutdown => {
                info!("Handling Shutdown request");
                self.state.write().await.request_shutdown();
                if let Some(ref handle) = self.shutdown {
                    handle.trigger();
                }
                Response::Ok
            }
            _ if shutting_down => {
                Response::error(ErrorCode::ShuttingDown, "server is shutting down")
            }
            Request::ListAttendees => {
                let state = self.state.read().await;
                match state.repository.attendees() {
                    Ok(attendees) => Response::attendees(attendees),
                    Err(e) => e.into(),
                }
            }
            Request::ListMeetings => {
                let state = self.state.read().await;
                match state.repository.all_meetings() {
                    Ok(meetings) => Response::meetings(meetings),
                    Err(e) => e.into(),
                }
            }
            Request::FindSlots { params } => {
                debug!(
                    attendees = ?params.attendees,
                    duration = params.duration,
                    start_time = %params.start_time,
                    end_time = %params.end_time,
                    "Handling FindSlots request"
                );
                // One read guard spans lookup, search and ranking.
                let state = self.state.read().await;
                match state.find_slots(params) {
                    Ok(slots) => {
                        debug!(slot_count = slots.len(), "Returning slots");
                        Response::slots(slots)
                    }
                    Err(e) => {
                        warn!(error = %e, "Slot search failed");
                        e.into()
                    }
                }
            }
        };

        let elapsed = start.elapsed();
        Span::current().record("duration_ms", elapsed.as_millis() as u64);
        debug!(duration_ms = elapsed.as_millis() as u64, "Request handled");

        response
    }

    /// Serves requests on `conn` until the client disconnects.
    ///
    /// Returns [`ServerError::Shutdown`] after answering a `shutdown` request.
    pub async fn handle_connection(&self, mut conn: Connection) -> ServerResult<()> {
        loop {
            let envelope = match conn.read_request().await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => {
                    debug!("Client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Error reading request");
                    return Err(e);
                }
            };

            let response = if envelope.is_compatible() {
                self.handle(&envelope.payload).await
            } else {
                warn!(
                    version = %envelope.protocol_version,
                    expected = PROTOCOL_VERSION,
                    "Incompatible protocol version"
                );
                Response::from_error(ErrorResponse::invalid_request(format!(
                    "unsupported protocol version {:?}, expected {:?}",
                    envelope.protocol_version, PROTOCOL_VERSION
                )))
            };
            conn.respond(&envelope.request_id, response).await?;

            if matches!(envelope.payload, Request::Shutdown) && envelope.is_compatible() {
                return Err(ServerError::Shutdown);
            }
        }
    }
}

/// Creates a connection handler function for use with SocketServer::run.
pub fn make_connection_handler(
    handler: RequestHandler,
) -> impl Fn(Connection) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
+ Send
+ Sync
+ 'static {
    move |conn| {
        let handler = handler.clone();
        Box::pin(async move {
            if let Err(e) = handler.handle_connection(conn).await
                && !matches!(e, ServerError::Shutdown)
            {
                warn!(error = %e, "Connection handler error");
            }
        })
    }
}
