//! TCP transport: accept loop, per-connection reader and writer tasks.

pub mod codec;
pub mod error;
pub mod server;
pub mod session;

pub use error::{NetError, SendError};
pub use server::{ConnectionId, LoginVerdict, NetEvent, NetServer, OUTBOUND_QUEUE_LEN};
pub use session::{ConnectionHandle, SessionState};
