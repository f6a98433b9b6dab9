//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame truncated: need {needed} more bytes, have {remaining}")]
    Truncated { needed: usize, remaining: usize },

    #[error("frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("invalid UTF-8 in frame payload")]
    InvalidUtf8,

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}
