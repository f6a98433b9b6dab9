use tokio::sync::oneshot;
use tracing::{info, warn};

use nighttree_net::LoginVerdict;
use nighttree_proto::LoginRequest;

use crate::persistence::PlayerRecord;

use super::*;

impl ConnectionHandler {
    /// Reason to refuse this login, if any.
    fn login_rejection(&self, login: &LoginRequest) -> Option<&'static str> {
        if let Some(password) = self.config.server.required_password() {
            if login.password != password {
                return Some("Incorrect password");
            }
        }
        if self.permissions.is_banned(&login.id) {
            return Some("You are banned from this server");
        }
        None
    }

    pub(super) fn handle_login(
        &mut self,
        conn: ConnectionHandle,
        login: LoginRequest,
        verdict: oneshot::Sender<LoginVerdict>,
    ) {
        if let Some(reason) = self.login_rejection(&login) {
            info!("Rejected login for {} from {}: {reason}", login.id, conn.peer());
            let _ = conn.send(ServerMessage::disconnect(reason));
            let _ = verdict.send(LoginVerdict::Rejected);
            return;
        }

        let id = login.id;
        let record = self
            .world
            .players
            .entry(id.clone())
            .and_modify(|r| r.color = login.color)
            .or_insert_with(|| PlayerRecord::new(login.color))
            .clone();
        self.world.save_players();

        let position = record.position();
        if let Some(previous) = self.sessions.register(&id, conn.clone(), position) {
            warn!(
                "{id} logged in again from {}; connection {} stays open",
                conn.peer(),
                previous.conn.id()
            );
        }
        self.connections.insert(
            conn.id(),
            ConnectionState {
                handle: conn.clone(),
                player_id: id.clone(),
                played: false,
            },
        );

        let welcome = ServerMessage::Welcome {
            id: id.clone(),
            motd: self.config.server.motd.clone(),
            server: self.config.server.name.clone(),
            world: self.world.grid.to_rows(),
            x: record.x,
            y: record.y,
            hotbar: record.items.hotbar,
            inventory: record.items.inventory,
            level: self.permissions.level(&id),
            color: record.color,
            max_players: self.config.server.max_players,
            current_players: self.sessions.len(),
        };
        if let Err(e) = conn.send(welcome) {
            warn!("Could not welcome {id}: {e}");
            self.sessions.unregister(&id, conn.id());
            self.connections.remove(&conn.id());
            let _ = verdict.send(LoginVerdict::Rejected);
            return;
        }

        for (other_id, session) in self.sessions.iter() {
            if other_id == id {
                continue;
            }
            let color = self
                .world
                .players
                .get(other_id)
                .map(|r| r.color)
                .unwrap_or_default();
            let _ = conn.send(ServerMessage::PlayerJoin {
                id: other_id.to_string(),
                x: session.position.0,
                y: session.position.1,
                color,
            });
        }

        self.sessions.broadcast(
            &ServerMessage::PlayerJoin {
                id: id.clone(),
                x: position.0,
                y: position.1,
                color: login.color,
            },
            Some(&id),
        );
        let _ = verdict.send(LoginVerdict::Accepted);
    }

    pub(super) fn handle_closed(&mut self, conn_id: ConnectionId) {
        let Some(state) = self.connections.remove(&conn_id) else {
            return;
        };
        self.sessions.unregister(&state.player_id, conn_id);

        if state.played && !self.sessions.contains(&state.player_id) {
            self.sessions.broadcast(
                &ServerMessage::PlayerLeave {
                    id: state.player_id.clone(),
                },
                None,
            );
            info!(
                "Player {} disconnected ({} online)",
                state.player_id,
                self.sessions.len()
            );
        }
        state.handle.close();
    }
}
