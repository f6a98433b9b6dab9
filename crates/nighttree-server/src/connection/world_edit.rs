//! Block breaking and placing, and client inventory sync.
//!
//! Invalid requests are ignored without a reply.

use nighttree_proto::{BlockKind, Hotbar, Inventory};

use super::*;

impl ConnectionHandler {
    pub(super) fn handle_break_block(&mut self, conn_id: ConnectionId, id: &str, x: i64, y: i64) {
        let Some((cx, cy)) = self.world.grid.cell(x, y) else {
            debug!("{id} tried to break out of bounds at ({x}, {y})");
            return;
        };
        let Some(broken) = self.world.grid.get(x, y) else {
            return;
        };
        if !broken.is_breakable() {
            debug!("{id} tried to break {broken} at ({x}, {y})");
            return;
        }
        if !self.world.players.contains_key(id) {
            return;
        }

        self.world.grid.set(x, y, BlockKind::Air);
        self.world.save_world();

        let Some(record) = self.world.players.get_mut(id) else {
            return;
        };
        let deposit = record.items.deposit(broken);
        let (hotbar, inventory) = (record.items.hotbar, record.items.inventory);
        debug!("{id} broke {broken} at ({x}, {y}) -> {deposit:?}");
        self.world.save_players();

        self.reply(conn_id, ServerMessage::HotbarUpdate { hotbar });
        self.reply(conn_id, ServerMessage::InventoryUpdate { inventory });
        self.sessions.broadcast(
            &ServerMessage::UpdateBlock {
                x: cx,
                y: cy,
                block: BlockKind::Air,
            },
            None,
        );
    }

    pub(super) fn handle_place_block(
        &mut self,
        conn_id: ConnectionId,
        id: &str,
        x: i64,
        y: i64,
        slot: i64,
    ) {
        let Some((cx, cy)) = self.world.grid.cell(x, y) else {
            debug!("{id} tried to place out of bounds at ({x}, {y})");
            return;
        };
        match self.world.grid.get(x, y) {
            Some(target) if target.is_replaceable() => {}
            Some(target) => {
                debug!("{id} tried to place into {target} at ({x}, {y})");
                return;
            }
            None => return,
        }
        let Some(record) = self.world.players.get_mut(id) else {
            return;
        };
        let Some(block) = record.items.take_from_hotbar(slot) else {
            debug!("{id} tried to place from empty slot {slot}");
            return;
        };
        let hotbar = record.items.hotbar;

        self.world.grid.set(x, y, block);
        self.world.save_world();
        self.world.save_players();

        self.reply(conn_id, ServerMessage::HotbarUpdate { hotbar });
        self.sessions.broadcast(
            &ServerMessage::UpdateBlock {
                x: cx,
                y: cy,
                block,
            },
            None,
        );
    }

    /// Store the client's containers as sent. Not checked against what the
    /// player actually owns.
    pub(super) fn handle_sync_inventory(&mut self, id: &str, hotbar: Hotbar, inventory: Inventory) {
        if let Some(record) = self.world.players.get_mut(id) {
            record.items.replace(hotbar, inventory);
            self.world.save_players();
        }
    }
}
