use nighttree_proto::PlayerColor;

use super::*;

impl ConnectionHandler {
    /// Record the new position and relay it. Written to disk with the next
    /// player save.
    pub(super) fn handle_move(&mut self, id: &str, x: f64, y: f64) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.position = (x, y);
        }
        if let Some(record) = self.world.players.get_mut(id) {
            record.set_position((x, y));
        }
        self.sessions.broadcast(
            &ServerMessage::PlayerMove {
                id: id.to_string(),
                x,
                y,
            },
            Some(id),
        );
    }

    pub(super) fn handle_update_color(
        &mut self,
        conn_id: ConnectionId,
        id: &str,
        color: PlayerColor,
    ) {
        if let Some(record) = self.world.players.get_mut(id) {
            record.color = color;
        }
        self.world.save_players();
        self.sessions.broadcast(
            &ServerMessage::PlayerColor {
                id: id.to_string(),
                color,
            },
            Some(id),
        );
        self.reply(conn_id, ServerMessage::ColorUpdated { color });
    }
}
