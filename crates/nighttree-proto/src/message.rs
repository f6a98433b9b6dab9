//! Message catalogs for both directions.
//!
//! Every frame payload is a JSON object whose `"type"` field selects the
//! variant. Decoding into these closed enums happens once, at the transport
//! boundary; an unknown `"type"` or a missing field is a malformed frame.

use serde::{Deserialize, Serialize};

use crate::item_stack::{Hotbar, Inventory};
use crate::types::{BlockKind, PlayerColor};

/// First frame a client must send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub color: PlayerColor,
}

/// Client → server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Login(LoginRequest),
    Chat {
        message: String,
    },
    /// Clients throttle these to 20/s themselves; the server does not.
    Move {
        x: f64,
        y: f64,
    },
    BreakBlock {
        x: i64,
        y: i64,
    },
    PlaceBlock {
        x: i64,
        y: i64,
        slot: i64,
    },
    UpdateColor {
        color: PlayerColor,
    },
    /// Whole-container replacement after a client-side drag and drop.
    SyncInventory {
        hotbar: Hotbar,
        inventory: Inventory,
    },
}

impl ClientMessage {
    /// Wire discriminant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Chat { .. } => "chat",
            Self::Move { .. } => "move",
            Self::BreakBlock { .. } => "break_block",
            Self::PlaceBlock { .. } => "place_block",
            Self::UpdateColor { .. } => "update_color",
            Self::SyncInventory { .. } => "sync_inventory",
        }
    }
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        id: String,
        motd: String,
        server: String,
        world: Vec<Vec<BlockKind>>,
        x: f64,
        y: f64,
        hotbar: Hotbar,
        inventory: Inventory,
        level: i32,
        color: PlayerColor,
        max_players: u32,
        current_players: usize,
    },
    Respawn {
        x: f64,
        y: f64,
    },
    Chat {
        from: String,
        level: i32,
        message: String,
    },
    UpdateBlock {
        x: usize,
        y: usize,
        block: BlockKind,
    },
    PlayerJoin {
        id: String,
        x: f64,
        y: f64,
        color: PlayerColor,
    },
    PlayerMove {
        id: String,
        x: f64,
        y: f64,
    },
    PlayerColor {
        id: String,
        color: PlayerColor,
    },
    PlayerLeave {
        id: String,
    },
    HotbarUpdate {
        hotbar: Hotbar,
    },
    InventoryUpdate {
        inventory: Inventory,
    },
    Disconnect {
        reason: String,
    },
    ColorUpdated {
        color: PlayerColor,
    },
}

impl ServerMessage {
    /// Sender name used for server-originated chat lines.
    pub const SERVER_NAME: &'static str = "SERVER";

    /// Level shown on server-originated chat lines.
    pub const SERVER_LEVEL: i32 = 999;

    /// A private chat line from the server.
    pub fn server_chat(message: impl Into<String>) -> Self {
        Self::Chat {
            from: Self::SERVER_NAME.to_string(),
            level: Self::SERVER_LEVEL,
            message: message.into(),
        }
    }

    pub fn disconnect(reason: impl Into<String>) -> Self {
        Self::Disconnect {
            reason: reason.into(),
        }
    }

    /// Wire discriminant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::Respawn { .. } => "respawn",
            Self::Chat { .. } => "chat",
            Self::UpdateBlock { .. } => "update_block",
            Self::PlayerJoin { .. } => "player_join",
            Self::PlayerMove { .. } => "player_move",
            Self::PlayerColor { .. } => "player_color",
            Self::PlayerLeave { .. } => "player_leave",
            Self::HotbarUpdate { .. } => "hotbar_update",
            Self::InventoryUpdate { .. } => "inventory_update",
            Self::Disconnect { .. } => "disconnect",
            Self::ColorUpdated { .. } => "color_updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_stack::{empty_hotbar, empty_inventory, ItemStack};

    #[test]
    fn login_from_client_json() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"login","id":"Alice","password":"pw","color":"green"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Login(LoginRequest {
                id: "Alice".into(),
                password: "pw".into(),
                color: PlayerColor::Green,
            })
        );
    }

    #[test]
    fn login_optional_fields_default() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"login","id":"Bob"}"#).unwrap();
        match msg {
            ClientMessage::Login(login) => {
                assert_eq!(login.password, "");
                assert_eq!(login.color, PlayerColor::Blue);
            }
            other => panic!("expected login, got {other:?}"),
        }
    }

    #[test]
    fn login_without_id_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"login"}"#).is_err());
    }

    #[test]
    fn place_block_json() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"place_block","x":6,"y":5,"slot":2}"#).unwrap();
        assert_eq!(msg, ClientMessage::PlaceBlock { x: 6, y: 5, slot: 2 });
    }

    #[test]
    fn sync_inventory_json() {
        let mut hotbar = empty_hotbar();
        hotbar[3] = ItemStack::new(BlockKind::Sand, 5);
        let msg = ClientMessage::SyncInventory {
            hotbar,
            inventory: empty_inventory(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "sync_inventory");
        assert_eq!(json["hotbar"][3]["block"], "sand");
        assert_eq!(json["inventory"].as_array().unwrap().len(), 21);
    }

    #[test]
    fn update_block_json() {
        let msg = ServerMessage::UpdateBlock {
            x: 5,
            y: 5,
            block: BlockKind::Air,
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"update_block","x":5,"y":5,"block":"air"}"#
        );
    }

    #[test]
    fn server_chat_uses_server_identity() {
        let json = serde_json::to_value(ServerMessage::server_chat("You are muted.")).unwrap();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["from"], "SERVER");
        assert_eq!(json["level"], 999);
        assert_eq!(json["message"], "You are muted.");
    }

    #[test]
    fn player_color_variant_tag() {
        let msg = ServerMessage::PlayerColor {
            id: "Alice".into(),
            color: PlayerColor::Cyan,
        };
        assert_eq!(msg.kind(), "player_color");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "player_color");
        assert_eq!(json["color"], "cyan");
    }
}
