//! Request and response types for the slotz protocol.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use slotz_core::{Attendee, CandidateSlot, Meeting, SearchRequest, SlotError, SlotResult};

use crate::PROTOCOL_VERSION;

/// Greeting returned in [`Response::Pong`].
pub const WELCOME_MESSAGE: &str = "Welcome to Slotz!";

/// Message envelope wrapping all protocol messages.
///
/// Every message exchanged between client and server is wrapped in this envelope
/// which provides versioning and request correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version (always "1" for v1).
    pub protocol_version: String,
    /// Unique request ID for correlation.
    pub request_id: String,
    /// The actual payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the current protocol version.
    pub fn new(request_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            payload,
        }
    }

    pub fn request(request_id: impl Into<String>, request: T) -> Self {
        Self::new(request_id, request)
    }

    pub fn response(request_id: impl Into<String>, response: T) -> Self {
        Self::new(request_id, response)
    }

    /// Checks if this envelope uses a compatible protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

/// Request types that can be sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check server liveness.
    Ping,

    /// List every known attendee.
    ListAttendees,

    /// List every stored meeting.
    ListMeetings,

    /// Find and rank free slots.
    FindSlots {
        #[serde(flatten)]
        params: FindSlotsParams,
    },

    /// Request server shutdown.
    Shutdown,
}

impl Request {
    /// Creates a FindSlots request.
    pub fn find_slots(params: FindSlotsParams) -> Self {
        Self::FindSlots { params }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::ListAttendees => "list_attendees",
            Self::ListMeetings => "list_meetings",
            Self::FindSlots { .. } => "find_slots",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Parameters of a slot search as they travel on the wire.
///
/// Timestamps stay strings until [`to_search_request`](Self::to_search_request)
/// so that any RFC 3339 offset is accepted and a malformed value is reported
/// as an invalid request rather than a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindSlotsParams {
    /// Attendee names; unknown names are ignored by the server.
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Meeting length in seconds.
    pub duration: i64,
    /// RFC 3339 window start.
    pub start_time: String,
    /// RFC 3339 window end.
    pub end_time: String,
}

impl FindSlotsParams {
    pub fn new(
        attendees: Vec<String>,
        duration: Duration,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            attendees,
            duration: duration.num_seconds(),
            start_time: start_time.to_rfc3339(),
            end_time: end_time.to_rfc3339(),
        }
    }

    /// Parses the timestamps and builds a validated search request for
    /// the already-resolved `attendees`.
    pub fn to_search_request(&self, attendees: Vec<Attendee>) -> SlotResult<SearchRequest> {
        let start = parse_timestamp("start_time", &self.start_time)?;
        let end = parse_timestamp("end_time", &self.end_time)?;
        let duration = Duration::try_seconds(self.duration).ok_or_else(|| {
            SlotError::invalid_request(format!("duration {}s is out of range", self.duration))
        })?;
        SearchRequest::new(attendees, duration, start, end)
    }
}

/// Parses an RFC 3339 timestamp with any UTC offset into UTC.
pub fn parse_timestamp(field: &str, value: &str) -> SlotResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            SlotError::invalid_request(format!("{field} {value:?} is not RFC 3339: {e}"))
        })
}

/// Response types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to Ping.
    Pong { message: String },

    /// Known attendees.
    Attendees { attendees: Vec<Attendee> },

    /// Stored meetings.
    Meetings { meetings: Vec<Meeting> },

    /// Ranked free slots, best first.
    Slots { slots: Vec<CandidateSlot> },

    /// Generic success response.
    Ok,

    /// Error response.
    Error {
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    pub fn pong() -> Self {
        Self::Pong {
            message: WELCOME_MESSAGE.to_string(),
        }
    }

    pub fn attendees(attendees: Vec<Attendee>) -> Self {
        Self::Attendees { attendees }
    }

    pub fn meetings(meetings: Vec<Meeting>) -> Self {
        Self::Meetings { meetings }
    }

    pub fn slots(slots: Vec<CandidateSlot>) -> Self {
        Self::Slots { slots }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse::new(code, message),
        }
    }

    /// Creates an error response from an ErrorResponse.
    pub fn from_error(error: ErrorResponse) -> Self {
        Self::Error { error }
    }

    /// Returns true for anything but an error response.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Returns the error if this is an error response.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

impl From<SlotError> for Response {
    fn from(err: SlotError) -> Self {
        Self::from_error(err.into())
    }
}

/// Error codes for protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed request or violated precondition; retrying will not help.
    InvalidRequest,

    /// The attendee/meeting repository failed.
    RepositoryError,

    /// The answer exceeded the frame size limit; a narrower window helps.
    ResponseTooLarge,

    /// Server is shutting down.
    ShuttingDown,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "The request was invalid",
            Self::RepositoryError => "The meeting repository returned an error",
            Self::ResponseTooLarge => "The response is too large to send",
            Self::ShuttingDown => "Server is shutting down",
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }
}

impl From<SlotError> for ErrorResponse {
    fn from(err: SlotError) -> Self {
        let code = if err.is_invalid_input() {
            ErrorCode::InvalidRequest
        } else {
            ErrorCode::RepositoryError
        };
        Self::new(code, err.to_string())
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn params() -> FindSlotsParams {
        FindSlotsParams {
            attendees: vec!["Ada".to_string(), "Grace".to_string()],
            duration: 3600,
            start_time: "2022-06-06T09:00:00+02:00".to_string(),
            end_time: "2022-06-06T10:00:00+02:00".to_string(),
        }
    }

    mod envelope {
        use super::*;

        #[test]
        fn creation() {
            let envelope = Envelope::request("req-123", Request::Ping);
            assert_eq!(envelope.protocol_version, "1");
            assert_eq!(envelope.request_id, "req-123");
            assert!(envelope.is_compatible());
        }

        #[test]
        fn incompatible_version() {
            let envelope = Envelope {
                protocol_version: "2".to_string(),
                request_id: "req-123".to_string(),
                payload: Request::Ping,
            };
            assert!(!envelope.is_compatible());
        }
    }

    mod requests {
        use super::*;

        #[test]
        fn unit_variants() {
            let json = serde_json::to_string(&Request::ListAttendees).unwrap();
            assert_eq!(json, r#"{"type":"list_attendees"}"#);
            let parsed: Request = serde_json::from_str(r#"{"type":"shutdown"}"#).unwrap();
            assert_eq!(parsed, Request::Shutdown);
        }

        #[test]
        fn find_slots_is_flat() {
            let request = Request::find_slots(params());
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["type"], "find_slots");
            assert_eq!(value["duration"], 3600);
            assert_eq!(value["attendees"][1], "Grace");

            let parsed: Request = serde_json::from_value(value).unwrap();
            assert_eq!(parsed, request);
            assert_eq!(parsed.kind(), "find_slots");
        }

        #[test]
        fn find_slots_attendees_default_to_empty() {
            let json = r#"{"type":"find_slots","duration":60,"start_time":"2022-06-06T09:00:00Z","end_time":"2022-06-06T10:00:00Z"}"#;
            match serde_json::from_str::<Request>(json).unwrap() {
                Request::FindSlots { params } => assert!(params.attendees.is_empty()),
                other => panic!("unexpected request: {other:?}"),
            }
        }

        #[test]
        fn unknown_type_is_rejected() {
            assert!(serde_json::from_str::<Request>(r#"{"type":"status"}"#).is_err());
        }
    }

    mod search_params {
        use super::*;

        #[test]
        fn offsets_are_converted_to_utc() {
            let request = params()
                .to_search_request(vec![Attendee::new("Ada")])
                .unwrap();
            assert_eq!(request.attendees(), &[Attendee::new("Ada")]);
            assert_eq!(request.start_time(), utc(2022, 6, 6, 7, 0, 0));
            assert_eq!(request.end_time(), utc(2022, 6, 6, 8, 0, 0));
            assert_eq!(request.duration(), Duration::hours(1));
        }

        #[test]
        fn new_formats_rfc3339() {
            let params = FindSlotsParams::new(
                vec![],
                Duration::minutes(30),
                utc(2022, 6, 6, 7, 0, 0),
                utc(2022, 6, 6, 8, 0, 0),
            );
            assert_eq!(params.duration, 1800);
            assert_eq!(params.start_time, "2022-06-06T07:00:00+00:00");
        }

        #[test]
        fn malformed_timestamp_is_invalid_request() {
            let mut bad = params();
            bad.start_time = "next tuesday".to_string();
            let err = bad.to_search_request(vec![]).unwrap_err();
            assert!(matches!(err, SlotError::InvalidRequest(_)));
            assert!(err.to_string().contains("start_time"));
        }

        #[test]
        fn preconditions_are_checked() {
            let mut zero = params();
            zero.duration = 0;
            assert!(zero.to_search_request(vec![]).is_err());

            let mut reversed = params();
            std::mem::swap(&mut reversed.start_time, &mut reversed.end_time);
            assert!(reversed.to_search_request(vec![]).is_err());

            let mut huge = params();
            huge.duration = i64::MAX;
            assert!(huge.to_search_request(vec![]).is_err());
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn pong_carries_welcome() {
            let json = serde_json::to_string(&Response::pong()).unwrap();
            assert_eq!(json, r#"{"type":"pong","message":"Welcome to Slotz!"}"#);
        }

        #[test]
        fn ok() {
            let json = serde_json::to_string(&Response::Ok).unwrap();
            assert_eq!(json, r#"{"type":"ok"}"#);
        }

        #[test]
        fn slots_wire_format() {
            let slot = CandidateSlot::new(utc(2022, 6, 6, 7, 0, 0), Duration::hours(1))
                .with_weight(0.5);
            let response = Response::slots(vec![slot]);
            let value = serde_json::to_value(&response).unwrap();
            insta::assert_json_snapshot!(value, @r#"
            {
              "slots": [
                {
                  "end_time": "2022-06-06T08:00:00Z",
                  "start_time": "2022-06-06T07:00:00Z",
                  "weight": 0.5
                }
              ],
              "type": "slots"
            }
            "#);

            let parsed: Response = serde_json::from_value(value).unwrap();
            assert_eq!(parsed, response);
        }

        #[test]
        fn error_is_flattened() {
            let response = Response::error(ErrorCode::InvalidRequest, "missing field");
            let json = serde_json::to_string(&response).unwrap();
            assert!(json.contains(r#""type":"error""#));
            assert!(json.contains(r#""code":"invalid_request""#));
            assert!(json.contains("missing field"));

            let parsed: Response = serde_json::from_str(&json).unwrap();
            assert!(!parsed.is_success());
            assert_eq!(parsed.as_error().unwrap().code, ErrorCode::InvalidRequest);
        }

        #[test]
        fn slot_errors_map_to_codes() {
            let response = Response::from(SlotError::invalid_request("bad duration"));
            assert_eq!(response.as_error().unwrap().code, ErrorCode::InvalidRequest);

            let error = ErrorResponse::from(SlotError::invalid_meeting("empty"));
            assert_eq!(error.code, ErrorCode::InvalidRequest);

            let error = ErrorResponse::from(SlotError::repository("offline"));
            assert_eq!(error.code, ErrorCode::RepositoryError);
            assert_eq!(error.message, "repository error: offline");
        }

        #[test]
        fn error_display() {
            let error = ErrorResponse::invalid_request("bad request");
            let display = error.to_string();
            assert!(display.contains("invalid"));
            assert!(display.contains("bad request"));
            assert!(!ErrorCode::ShuttingDown.description().is_empty());
        }

        #[test]
        fn oversized_code_wire_name() {
            let json = serde_json::to_string(&ErrorCode::ResponseTooLarge).unwrap();
            assert_eq!(json, r#""response_too_large""#);
        }
    }
}
