//! The server actor: owns the world, player records, permission tables and
//! live sessions, and applies every client message and command in order.

mod commands;
mod login;
mod movement;
mod world_edit;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use nighttree_command::{CommandLine, CommandResult, Issuer};
use nighttree_net::{ConnectionHandle, ConnectionId, NetEvent};
use nighttree_proto::{ClientMessage, ServerMessage};

use crate::config::ServerConfig;
use crate::permissions::PermissionManager;
use crate::persistence::WorldStore;
use crate::registry::SessionRegistry;

/// One accepted connection.
struct ConnectionState {
    handle: ConnectionHandle,
    player_id: String,
    /// Set once any post-login message arrives. Server-list status checks
    /// log in and disconnect without sending anything.
    played: bool,
}

pub struct ConnectionHandler {
    config: Arc<ServerConfig>,
    world: WorldStore,
    permissions: PermissionManager,
    sessions: SessionRegistry,
    connections: HashMap<ConnectionId, ConnectionState>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ConnectionHandler {
    pub fn new(
        config: Arc<ServerConfig>,
        world: WorldStore,
        permissions: PermissionManager,
        shutdown_tx: Arc<watch::Sender<bool>>,
    ) -> Self {
        Self {
            config,
            world,
            permissions,
            sessions: SessionRegistry::new(),
            connections: HashMap::new(),
            shutdown_tx,
        }
    }

    /// Process one transport event.
    pub fn handle_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::Login {
                conn,
                login,
                verdict,
            } => self.handle_login(conn, login, verdict),
            NetEvent::Message { conn_id, message } => self.handle_message(conn_id, message),
            NetEvent::Closed { conn_id } => self.handle_closed(conn_id),
        }
    }

    /// Run a console line as `CONSOLE` and return the reply text.
    pub fn handle_console_command(&mut self, line: &str) -> String {
        let line = line.trim();
        if !line.starts_with('/') {
            let hint = "Commands must start with /. Try /help.";
            info!("{hint}");
            return hint.into();
        }
        info!("Console issued command: {line}");
        let reply = self.dispatch_command(&Issuer::Console, line).text();
        info!("{reply}");
        reply
    }

    /// Flush the world, player records and every table.
    pub fn save_all(&self) {
        self.world.save_world();
        self.world.save_players();
        self.permissions.save_all();
        info!("All data saved");
    }

    fn handle_message(&mut self, conn_id: ConnectionId, message: ClientMessage) {
        let Some(state) = self.connections.get_mut(&conn_id) else {
            debug!("Message from unknown connection {conn_id}");
            return;
        };
        if state.handle.is_closed() {
            return;
        }
        if !state.played {
            state.played = true;
            info!(
                "Player {} connected from {}",
                state.player_id,
                state.handle.peer()
            );
        }
        let id = state.player_id.clone();

        match message {
            ClientMessage::Chat { message } => self.handle_chat(conn_id, &id, message),
            ClientMessage::Move { x, y } => self.handle_move(&id, x, y),
            ClientMessage::UpdateColor { color } => self.handle_update_color(conn_id, &id, color),
            ClientMessage::BreakBlock { x, y } => self.handle_break_block(conn_id, &id, x, y),
            ClientMessage::PlaceBlock { x, y, slot } => {
                self.handle_place_block(conn_id, &id, x, y, slot)
            }
            ClientMessage::SyncInventory { hotbar, inventory } => {
                self.handle_sync_inventory(&id, hotbar, inventory)
            }
            ClientMessage::Login(_) => debug!("Ignoring repeated login from {id}"),
        }
    }

    /// Queue a reply on the connection a request came from.
    fn reply(&self, conn_id: ConnectionId, message: ServerMessage) {
        if let Some(state) = self.connections.get(&conn_id) {
            if let Err(e) = state.handle.send(message) {
                debug!("Reply to connection {conn_id} dropped: {e}");
            }
        }
    }

    /// Remove a live session and close its connection with `reason`.
    /// Returns whether the player was online.
    fn kick(&mut self, id: &str, reason: &str) -> bool {
        let Some(session) = self.sessions.remove(id) else {
            return false;
        };
        let _ = session.conn.send(ServerMessage::disconnect(reason));
        session.conn.close();
        info!("Kicked {id}: {reason}");
        true
    }

    /// Run one command line. A result asking to stop saves every table and
    /// raises the shutdown flag.
    fn dispatch_command(&mut self, issuer: &Issuer, line: &str) -> CommandResult {
        let result = match CommandLine::parse(line) {
            Some(cmd) => self.execute_command(issuer, &cmd),
            None => CommandResult::err("Empty command."),
        };
        if !result.success {
            debug!("Command '{line}' from {} failed: {}", issuer.id(), result.text());
        }
        if result.should_stop {
            info!("Stopping the server...");
            self.save_all();
            self.shutdown_tx.send_replace(true);
        }
        result
    }
}
