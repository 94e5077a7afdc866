//! Length-prefixed message framing.
//!
//! ```text
//! +----------------+------------------+
//! | length (4 BE)  |  JSON payload    |
//! +----------------+------------------+
//! ```
//!
//! Both ends read the 4-byte prefix first, validate it with
//! [`read_frame_len`], then read exactly that many payload bytes.

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

const PREFIX_LEN: usize = 4;

/// Serializes `message` and prepends its length.
///
/// ```rust
/// use slotz_protocol::{encode_message, Request, Envelope};
///
/// let bytes = encode_message(&Envelope::request("req-1", Request::Ping)).unwrap();
/// assert!(bytes.len() > 4);
/// ```
pub fn encode_message<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    let json = serde_json::to_vec(message)?;
    let len = u32::try_from(json.len())
        .ok()
        .filter(|len| *len <= MAX_MESSAGE_SIZE)
        .ok_or(ProtocolError::MessageTooLarge {
            size: u32::try_from(json.len()).unwrap_or(u32::MAX),
            max: MAX_MESSAGE_SIZE,
        })?;

    let mut buffer = Vec::with_capacity(PREFIX_LEN + json.len());
    buffer.extend_from_slice(&len.to_be_bytes());
    buffer.extend_from_slice(&json);
    Ok(buffer)
}

/// Validates a length prefix and returns the payload size it announces.
///
/// Zero-length and oversized frames are rejected.
pub fn read_frame_len(prefix: [u8; 4]) -> ProtocolResult<usize> {
    let len = u32::from_be_bytes(prefix);
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    if len == 0 {
        return Err(ProtocolError::EmptyMessage);
    }
    Ok(len as usize)
}

/// Decodes one complete frame (prefix + payload).
///
/// Trailing bytes after the announced payload are ignored.
pub fn decode_message<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<T> {
    let prefix: [u8; 4] = data
        .get(..PREFIX_LEN)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ProtocolError::IncompleteMessage {
            expected: PREFIX_LEN,
            received: data.len(),
        })?;
    let len = read_frame_len(prefix)?;

    let payload = data
        .get(PREFIX_LEN..PREFIX_LEN + len)
        .ok_or(ProtocolError::IncompleteMessage {
            expected: PREFIX_LEN + len,
            received: data.len(),
        })?;
    Ok(serde_json::from_slice(payload)?)
}
