//! The supply-chain graph and the cross-node operations a period's
//! phases drive through it.

pub mod supply_chain;

pub use supply_chain::{has_predecessor_cycle, Inventory, SupplyChain};
