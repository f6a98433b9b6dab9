use nighttree_proto::ProtoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),
}

/// Why a message could not be queued for a connection.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    #[error("outbound queue is full")]
    Full,

    #[error("connection is closed")]
    Closed,
}
