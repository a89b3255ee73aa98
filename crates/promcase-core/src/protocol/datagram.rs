//! Datagram decoding (panic-free).
//!
//! A datagram is one line. Bytes that are not valid UTF-8 are replaced rather
//! than rejected; the grammar check in `parse_line` is the only gate.

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::line::{parse_line, Update};

/// Decode a UDP payload received from `from`.
pub fn decode_datagram(payload: Bytes, from: &str) -> Result<Update> {
    let text = String::from_utf8_lossy(&payload);
    parse_line(&text, from)
}
