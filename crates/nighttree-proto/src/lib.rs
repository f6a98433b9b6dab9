//! Night Tree wire protocol: length-prefixed JSON frames and message types.

pub mod codec;
pub mod error;
pub mod item_stack;
pub mod message;
pub mod types;

pub use codec::{decode_payload, encode_frame, frame_len, FRAME_HEADER_LEN, MAX_FRAME_LEN};
pub use error::ProtoError;
pub use item_stack::{empty_hotbar, empty_inventory, Hotbar, Inventory, ItemStack};
pub use message::{ClientMessage, LoginRequest, ServerMessage};
pub use types::{BlockKind, PlayerColor};
