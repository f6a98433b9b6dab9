//! ItemStack type and the fixed-size slot containers it lives in.
//!
//! A slot is `Option<ItemStack>`; `None` is an empty slot and serializes as
//! JSON `null`. A stack never holds fewer than 1 or more than
//! [`MAX_STACK_SIZE`] items: the count bound is enforced on construction and
//! on deserialization.

use serde::{Deserialize, Serialize};

use crate::types::BlockKind;

/// Maximum number of items in one stack.
pub const MAX_STACK_SIZE: u8 = 64;

/// Number of hotbar slots.
pub const HOTBAR_SIZE: usize = 7;

/// Number of backpack inventory slots.
pub const INVENTORY_SIZE: usize = 21;

pub type Hotbar = [Option<ItemStack>; HOTBAR_SIZE];
pub type Inventory = [Option<ItemStack>; INVENTORY_SIZE];

pub fn empty_hotbar() -> Hotbar {
    [None; HOTBAR_SIZE]
}

pub fn empty_inventory() -> Inventory {
    [None; INVENTORY_SIZE]
}

/// A (block kind, count) pair occupying one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawItemStack")]
pub struct ItemStack {
    block: BlockKind,
    count: u8,
}

/// Unvalidated wire form.
#[derive(Deserialize)]
struct RawItemStack {
    block: BlockKind,
    count: u32,
}

impl TryFrom<RawItemStack> for ItemStack {
    type Error = String;

    fn try_from(raw: RawItemStack) -> Result<Self, Self::Error> {
        u8::try_from(raw.count)
            .ok()
            .and_then(|count| ItemStack::new(raw.block, count))
            .ok_or_else(|| {
                format!(
                    "stack count {} out of range 1..={MAX_STACK_SIZE}",
                    raw.count
                )
            })
    }
}

impl ItemStack {
    /// Create a stack. Returns `None` if `count` is outside `1..=64`.
    pub fn new(block: BlockKind, count: u8) -> Option<Self> {
        if (1..=MAX_STACK_SIZE).contains(&count) {
            Some(Self { block, count })
        } else {
            None
        }
    }

    pub fn block(&self) -> BlockKind {
        self.block
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// How many more items fit on this stack.
    pub fn space(&self) -> u8 {
        MAX_STACK_SIZE - self.count
    }

    /// Add up to `amount` items; returns how many were added.
    pub fn grow(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.space() as u32);
        self.count += added as u8;
        added
    }

    /// Remove one item. Returns the remaining stack, or `None` if it emptied.
    pub fn take_one(self) -> Option<Self> {
        Self::new(self.block, self.count - 1)
    }
}
