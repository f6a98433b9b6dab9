//! Player hotbar and inventory management.
//!
//! The hotbar has 7 slots and the backpack inventory has 21. Empty slots are
//! `None`; occupied slots always hold a stack of 1..=64 items.

use serde::{Deserialize, Serialize};
use tracing::debug;

use nighttree_proto::item_stack::MAX_STACK_SIZE;
use nighttree_proto::{empty_hotbar, empty_inventory, BlockKind, Hotbar, Inventory, ItemStack};

/// Largest quantity a single `give` may request.
pub const GIVE_MAX: u32 = 999;

/// Where a broken block ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deposit {
    Hotbar(usize),
    Inventory(usize),
    /// No room anywhere; the item is lost.
    Discarded,
}

/// A player's hotbar and inventory slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInventory {
    pub hotbar: Hotbar,
    #[serde(default = "empty_inventory")]
    pub inventory: Inventory,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self {
            hotbar: empty_hotbar(),
            inventory: empty_inventory(),
        }
    }

    /// The loadout a player receives on first login: 10 stone in slot 0.
    pub fn starter() -> Self {
        let mut inv = Self::new();
        inv.hotbar[0] = ItemStack::new(BlockKind::Stone, 10);
        inv
    }

    /// Replace both containers wholesale.
    pub fn replace(&mut self, hotbar: Hotbar, inventory: Inventory) {
        self.hotbar = hotbar;
        self.inventory = inventory;
    }

    /// Store one unit of `block` after breaking it.
    ///
    /// Preference order: an existing same-kind hotbar stack with room, a
    /// same-kind inventory stack with room, the first empty hotbar slot, the
    /// first empty inventory slot.
    pub fn deposit(&mut self, block: BlockKind) -> Deposit {
        if let Some(i) = find_stack(&self.hotbar, block) {
            grow_slot(&mut self.hotbar[i], 1);
            return Deposit::Hotbar(i);
        }
        if let Some(i) = find_stack(&self.inventory, block) {
            grow_slot(&mut self.inventory[i], 1);
            return Deposit::Inventory(i);
        }
        if let Some(i) = find_empty(&self.hotbar) {
            self.hotbar[i] = ItemStack::new(block, 1);
            return Deposit::Hotbar(i);
        }
        if let Some(i) = find_empty(&self.inventory) {
            self.inventory[i] = ItemStack::new(block, 1);
            return Deposit::Inventory(i);
        }
        debug!("No room for {block}, discarding");
        Deposit::Discarded
    }

    /// Add up to `quantity` units of `block` to the hotbar only.
    ///
    /// Existing same-kind stacks are topped up first, then empty slots are
    /// filled with stacks of at most 64. Returns how many were added.
    pub fn give_to_hotbar(&mut self, block: BlockKind, quantity: u32) -> u32 {
        let mut remaining = quantity;

        for stack in self.hotbar.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if stack.block() == block {
                remaining -= stack.grow(remaining);
            }
        }

        for slot in self.hotbar.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let count = remaining.min(u32::from(MAX_STACK_SIZE));
                // count is in 1..=64 here
                *slot = ItemStack::new(block, count as u8);
                remaining -= count;
            }
        }

        quantity - remaining
    }

    /// Remove one item from hotbar `slot` and return its kind.
    ///
    /// Returns `None` for an out-of-range or empty slot. A stack that reaches
    /// zero becomes an empty slot.
    pub fn take_from_hotbar(&mut self, slot: i64) -> Option<BlockKind> {
        let index = usize::try_from(slot).ok()?;
        let entry = self.hotbar.get_mut(index)?;
        let stack = (*entry)?;
        *entry = stack.take_one();
        Some(stack.block())
    }

    #[cfg(test)]
    /// Total items of `block` across both containers.
    pub fn count_of(&self, block: BlockKind) -> u32 {
        self.hotbar
            .iter()
            .chain(self.inventory.iter())
            .flatten()
            .filter(|s| s.block() == block)
            .map(|s| u32::from(s.count()))
            .sum()
    }
}

fn find_stack(slots: &[Option<ItemStack>], block: BlockKind) -> Option<usize> {
    slots
        .iter()
        .position(|s| matches!(s, Some(stack) if stack.block() == block && stack.space() > 0))
}

fn find_empty(slots: &[Option<ItemStack>]) -> Option<usize> {
    slots.iter().position(Option::is_none)
}

fn grow_slot(slot: &mut Option<ItemStack>, amount: u32) {
    if let Some(stack) = slot {
        stack.grow(amount);
    }
}
