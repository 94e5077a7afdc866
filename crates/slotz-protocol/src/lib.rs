//! IPC framing and request/response types for slotz.
//!
//! The `slotz` CLI talks to `slotz serve` over a Unix socket using
//! protocol v1.
//!
//! # Wire format
//!
//! Messages are sent as length-prefixed JSON:
//! - 4 bytes: message length (u32, big-endian)
//! - N bytes: JSON payload
//!
//! Every message is wrapped in an [`Envelope`] carrying the protocol version
//! (`"1"`), a request id echoed back in the response, and the payload.
//!
//! ```rust
//! use slotz_protocol::{Envelope, Request, encode_message, decode_message};
//!
//! let request = Envelope::request("req-123", Request::Ping);
//! let bytes = encode_message(&request).unwrap();
//! let decoded: Envelope<Request> = decode_message(&bytes).unwrap();
//! assert_eq!(decoded, request);
//! ```

mod error;
mod framing;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{decode_message, encode_message, read_frame_len};
pub use types::{
    Envelope, ErrorCode, ErrorResponse, FindSlotsParams, Request, Response, WELCOME_MESSAGE,
    parse_timestamp,
};

/// Protocol version constant.
pub const PROTOCOL_VERSION: &str = "1";

/// Maximum message size (1 MB).
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;
