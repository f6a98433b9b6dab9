//! Frame encoding/decoding.
//!
//! A frame is a 4-byte big-endian payload length followed by that many bytes
//! of UTF-8 JSON. The framing is identical in both directions.

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtoError;

/// Size of the length prefix.
pub const FRAME_HEADER_LEN: usize = 4;

/// Largest payload accepted in either direction (4 MiB).
pub const MAX_FRAME_LEN: usize = 4 * 1024 * 1024;

/// Serialize a message and prepend its length prefix.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Bytes, ProtoError> {
    let payload = serde_json::to_vec(message)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(ProtoError::FrameTooLarge {
            len: payload.len(),
            max: MAX_FRAME_LEN,
        });
    }
    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

/// Validate a length prefix and return the payload length it announces.
pub fn frame_len(header: [u8; FRAME_HEADER_LEN]) -> Result<usize, ProtoError> {
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtoError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    Ok(len)
}

/// Decode a frame payload (without its length prefix).
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtoError> {
    let text = std::str::from_utf8(payload).map_err(|_| ProtoError::InvalidUtf8)?;
    Ok(serde_json::from_str(text)?)
}
