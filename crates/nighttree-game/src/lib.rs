//! Game rules shared by the server: hotbar and inventory stacking.

pub mod inventory;

pub use inventory::{Deposit, PlayerInventory, GIVE_MAX};
