use std::net::SocketAddr;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use nighttree_proto::{ClientMessage, LoginRequest};

use crate::error::NetError;
use crate::session::{run_connection, ConnectionHandle};

/// Unique id assigned to every accepted connection.
pub type ConnectionId = u64;

/// Messages a connection may have queued before it is considered stalled.
pub const OUTBOUND_QUEUE_LEN: usize = 256;

const EVENT_QUEUE_LEN: usize = 1024;

/// Decision on a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginVerdict {
    Accepted,
    /// Any reply (such as a disconnect reason) must already be queued.
    Rejected,
}

/// Events emitted by the transport to the game server.
#[derive(Debug)]
pub enum NetEvent {
    /// A connection sent a well-formed login as its first frame. The
    /// connection waits for `verdict` before reading further.
    Login {
        conn: ConnectionHandle,
        login: LoginRequest,
        verdict: oneshot::Sender<LoginVerdict>,
    },
    /// A decoded message from an accepted connection.
    Message {
        conn_id: ConnectionId,
        message: ClientMessage,
    },
    /// An accepted connection has ended. Sent exactly once per accepted login.
    Closed { conn_id: ConnectionId },
}

/// TCP accept loop.
pub struct NetServer {
    listener: TcpListener,
    event_tx: mpsc::Sender<NetEvent>,
    next_id: ConnectionId,
}

impl NetServer {
    /// Bind the listener. Returns the server and the event receiver.
    pub async fn bind(
        addr: impl ToSocketAddrs,
    ) -> Result<(Self, mpsc::Receiver<NetEvent>), NetError> {
        let listener = TcpListener::bind(addr).await?;
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_LEN);
        info!("Listening on {}", listener.local_addr()?);
        Ok((
            Self {
                listener,
                event_tx,
                next_id: 1,
            },
            event_rx,
        ))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the shutdown signal is received.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                res = self.listener.accept() => match res {
                    Ok((stream, peer)) => {
                        let id = self.next_id;
                        self.next_id += 1;
                        debug!("Accepted connection {id} from {peer}");
                        tokio::spawn(run_connection(
                            stream,
                            id,
                            peer,
                            OUTBOUND_QUEUE_LEN,
                            self.event_tx.clone(),
                        ));
                    }
                    Err(e) => warn!("Accept error: {e}"),
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Listener shutting down");
                        break;
                    }
                }
            }
        }
    }
}
