//! Per-connection tasks.
//!
//! Each accepted socket gets a reader task that runs the connection state
//! machine and a writer task that drains a bounded outbound queue. The game
//! side only ever holds a [`ConnectionHandle`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace};

use nighttree_proto::{ClientMessage, ServerMessage};

use crate::codec::{read_frame, write_frame};
use crate::error::SendError;
use crate::server::{ConnectionId, LoginVerdict, NetEvent};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingLogin,
    Active,
    Closed,
}

/// Cloneable sending side of one connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    peer: SocketAddr,
    outbound: mpsc::Sender<ServerMessage>,
    closer: Arc<watch::Sender<bool>>,
}

impl ConnectionHandle {
    /// Create a handle plus the receiving ends for its writer.
    pub fn new(
        id: ConnectionId,
        peer: SocketAddr,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ServerMessage>, watch::Receiver<bool>) {
        let (outbound, outbound_rx) = mpsc::channel(capacity);
        let (closer, closed_rx) = watch::channel(false);
        (
            Self {
                id,
                peer,
                outbound,
                closer: Arc::new(closer),
            },
            outbound_rx,
            closed_rx,
        )
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Queue a message without waiting.
    pub fn send(&self, message: ServerMessage) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }
        self.outbound.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::Full,
            mpsc::error::TrySendError::Closed(_) => SendError::Closed,
        })
    }

    /// Ask both tasks to stop. Messages already queued are still written.
    pub fn close(&self) {
        self.closer.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closer.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.closer.subscribe()
    }
}

/// Resolves once the connection has been asked to close.
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|c| *c).await;
}

/// Drive one accepted socket until it closes.
pub(crate) async fn run_connection(
    stream: TcpStream,
    id: ConnectionId,
    peer: SocketAddr,
    capacity: usize,
    events: mpsc::Sender<NetEvent>,
) {
    let _ = stream.set_nodelay(true);
    let (read_half, write_half) = stream.into_split();
    let (handle, outbound_rx, mut closed) = ConnectionHandle::new(id, peer, capacity);
    let writer = tokio::spawn(write_loop(write_half, outbound_rx, handle.clone()));
    let mut reader = BufReader::new(read_half);
    let mut state = SessionState::AwaitingLogin;

    let first = tokio::select! {
        res = read_frame::<_, ClientMessage>(&mut reader) => res,
        _ = wait_closed(&mut closed) => Ok(None),
    };
    let login = match first {
        Ok(Some(ClientMessage::Login(login))) => Some(login),
        Ok(Some(other)) => {
            debug!("Connection {id} from {peer} sent {} before login", other.kind());
            None
        }
        Ok(None) => {
            trace!("Connection {id} from {peer} closed before login");
            None
        }
        Err(e) => {
            debug!("Connection {id} from {peer} sent a bad login frame: {e}");
            None
        }
    };

    if let Some(login) = login {
        let (verdict_tx, verdict_rx) = oneshot::channel();
        let event = NetEvent::Login {
            conn: handle.clone(),
            login,
            verdict: verdict_tx,
        };
        if events.send(event).await.is_ok()
            && matches!(verdict_rx.await, Ok(LoginVerdict::Accepted))
        {
            state = SessionState::Active;
        }
    }

    if state == SessionState::Active {
        loop {
            let res = tokio::select! {
                res = read_frame::<_, ClientMessage>(&mut reader) => res,
                _ = wait_closed(&mut closed) => break,
            };
            match res {
                Ok(Some(message)) => {
                    let event = NetEvent::Message {
                        conn_id: id,
                        message,
                    };
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Connection {id} closed by peer");
                    break;
                }
                Err(e) => {
                    debug!("Connection {id} read error: {e}");
                    break;
                }
            }
        }
        let _ = events.send(NetEvent::Closed { conn_id: id }).await;
    }

    state = SessionState::Closed;
    trace!("Connection {id} is {state:?}");
    handle.close();
    drop(handle);
    let _ = writer.await;
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<ServerMessage>,
    handle: ConnectionHandle,
) {
    let mut closed = handle.subscribe();
    loop {
        let message = tokio::select! {
            biased;
            message = outbound.recv() => message,
            _ = wait_closed(&mut closed) => outbound.try_recv().ok(),
        };
        let Some(message) = message else {
            break;
        };
        if let Err(e) = write_frame(&mut writer, &message).await {
            debug!("Connection {} write error: {e}", handle.id());
            handle.close();
            break;
        }
    }
    let _ = writer.shutdown().await;
}
