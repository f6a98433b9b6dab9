//! Async frame I/O over a byte stream.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use nighttree_proto::codec::frame_len;
use nighttree_proto::{decode_payload, encode_frame, ProtoError, FRAME_HEADER_LEN};

/// Read one frame and decode it.
///
/// Returns `Ok(None)` if the stream ends cleanly before a new frame starts.
/// End of stream inside a frame is [`ProtoError::Truncated`].
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, ProtoError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; FRAME_HEADER_LEN];
    let filled = read_full(reader, &mut header).await?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < FRAME_HEADER_LEN {
        return Err(ProtoError::Truncated {
            needed: FRAME_HEADER_LEN - filled,
            remaining: 0,
        });
    }

    let len = frame_len(header)?;
    let mut payload = vec![0u8; len];
    let filled = read_full(reader, &mut payload).await?;
    if filled < len {
        return Err(ProtoError::Truncated {
            needed: len - filled,
            remaining: 0,
        });
    }
    decode_payload(&payload).map(Some)
}

/// Encode `message` and write it as one frame.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), ProtoError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(message)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Fill `buf` until it is full or the stream ends. Returns bytes read.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
