//! Capability contracts a simulation run plugs in: how much to order, and
//! how to allocate stock against outstanding orders.

use crate::error::SimResult;
use crate::model::{Node, Orders};
use std::fmt::Debug;

/// Read-only view of the graph a strategy needs without owning it.
///
/// A strategy can't hold a `chain: SupplyChain` field, because the
/// `Simulator` needs `&mut` access to the same graph in the same scope a
/// strategy call happens in. Dependency injection per call resolves
/// that: the simulator passes a `&dyn ChainQuery` into each `get_orders`
/// call instead.
pub trait ChainQuery {
    fn node(&self, id: &str) -> Option<&Node>;
    fn inventory_assemblies_feasible(&self, node_id: &str) -> i64;
    /// Destination node ids of `node_id`'s direct successor edges.
    fn successor_ids(&self, node_id: &str) -> Vec<String>;
}

/// Decides how much of `node`'s own SKU (and, by explosion, its
/// predecessors') to order this period.
///
/// We require `Debug` so the engine can log the active strategy; `Send +
/// Sync` so a run can hand the same strategy to independently-owned
/// nodes.
pub trait ControlStrategy: Debug + Send + Sync {
    fn get_orders(&mut self, node: &Node, period: i64, chain: &dyn ChainQuery) -> SimResult<Orders>;
}

/// Decides how to allocate `node`'s on-hand stock across its outstanding
/// order lines.
pub trait ReleaseStrategy: Debug + Send + Sync {
    fn get_releases(&mut self, node: &Node) -> SimResult<Orders>;
}

/// Read a required `i64` field out of a node's opaque data bag.
pub(crate) fn require_i64(node: &Node, field: &str) -> SimResult<i64> {
    node.data
        .get(field)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| crate::error::SimError::InvalidNodeData {
            node_id: node.id.clone(),
            field: field.to_string(),
        })
}

/// Read a required `f64` field (accepting an integer JSON value too) out
/// of a node's opaque data bag.
pub(crate) fn require_f64(node: &Node, field: &str) -> SimResult<f64> {
    node.data
        .get(field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| crate::error::SimError::InvalidNodeData {
            node_id: node.id.clone(),
            field: field.to_string(),
        })
}
