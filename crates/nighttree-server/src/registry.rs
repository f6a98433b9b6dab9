//! Live sessions and broadcast fanout.

use std::collections::BTreeMap;

use tracing::warn;

use nighttree_net::{ConnectionHandle, ConnectionId};
use nighttree_proto::ServerMessage;

/// A logged-in player bound to an open connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub conn: ConnectionHandle,
    pub position: (f64, f64),
}

/// At most one session per player id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to `conn`. Returns the session it replaced, if any.
    pub fn register(
        &mut self,
        id: &str,
        conn: ConnectionHandle,
        position: (f64, f64),
    ) -> Option<Session> {
        self.sessions
            .insert(id.to_string(), Session { conn, position })
    }

    /// Remove `id` only if it is still bound to `conn_id`.
    pub fn unregister(&mut self, id: &str, conn_id: ConnectionId) -> Option<Session> {
        match self.sessions.get(id) {
            Some(session) if session.conn.id() == conn_id => self.sessions.remove(id),
            _ => None,
        }
    }

    /// Remove `id` regardless of which connection holds it.
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Session)> {
        self.sessions.iter().map(|(id, s)| (id.as_str(), s))
    }

    /// Queue `message` for one player. Returns whether it was queued.
    pub fn send_to(&self, id: &str, message: ServerMessage) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|s| s.conn.send(message).is_ok())
    }

    /// Queue `message` for every session except `exclude`.
    ///
    /// Never waits on a slow client. A session whose queue is full or
    /// closed is removed and its connection asked to close.
    pub fn broadcast(&mut self, message: &ServerMessage, exclude: Option<&str>) {
        let mut dropped = Vec::new();
        for (id, session) in &self.sessions {
            if Some(id.as_str()) == exclude {
                continue;
            }
            if let Err(e) = session.conn.send(message.clone()) {
                warn!("Dropping {id} during {} broadcast: {e}", message.kind());
                dropped.push(id.clone());
            }
        }
        for id in dropped {
            if let Some(session) = self.sessions.remove(&id) {
                session.conn.close();
            }
        }
    }
}
