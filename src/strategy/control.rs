//! Out-of-the-box `ControlStrategy` implementations.

use crate::error::SimResult;
use crate::model::{Node, Orders};
use crate::strategy::traits::{require_i64, ChainQuery, ControlStrategy};

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

/// Sum of `inventory_assemblies_feasible` over `start` and every node
/// reachable downstream of it (BFS through successor edges, de-duplicated
/// per hop), used by [`MultiEchelonRS`] to evaluate echelon inventory.
fn echelon_inventory(chain: &dyn ChainQuery, start: &str) -> i64 {
    let mut total = 0i64;
    let mut echelon = vec![start.to_string()];
    while !echelon.is_empty() {
        let mut next: Vec<String> = Vec::new();
        for node_id in &echelon {
            total += chain.inventory_assemblies_feasible(node_id);
            for successor in chain.successor_ids(node_id) {
                if !next.contains(&successor) {
                    next.push(successor);
                }
            }
        }
        echelon = next;
    }
    total
}

/// Single-echelon (R,s,Q): review periodically, order a multiple of
/// `order_quantity` up to (at least) `reorder_level`.
///
/// `node.data` must carry `review_time`, `reorder_level`, `order_quantity`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleEchelonRsQ;

impl ControlStrategy for SingleEchelonRsQ {
    fn get_orders(&mut self, node: &Node, period: i64, chain: &dyn ChainQuery) -> SimResult<Orders> {
        let review_time = require_i64(node, "review_time")?;
        let reorder_level = require_i64(node, "reorder_level")?;
        let order_quantity = require_i64(node, "order_quantity")?;
        let inventory = chain.inventory_assemblies_feasible(&node.id);

        let mut quantity = 0;
        if period % review_time == 0 && inventory < reorder_level {
            quantity = ceil_div(reorder_level - inventory, order_quantity) * order_quantity;
        }

        let mut orders = Orders::default();
        orders.set(node.id.as_str(), quantity);
        Ok(orders)
    }
}

/// Single-echelon (R,S): review periodically, order up to
/// `order_up_to_level`.
///
/// `node.data` must carry `review_time`, `order_up_to_level`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleEchelonRS;

impl ControlStrategy for SingleEchelonRS {
    fn get_orders(&mut self, node: &Node, period: i64, chain: &dyn ChainQuery) -> SimResult<Orders> {
        let review_time = require_i64(node, "review_time")?;
        let order_up_to_level = require_i64(node, "order_up_to_level")?;
        let inventory = chain.inventory_assemblies_feasible(&node.id);

        let mut quantity = 0;
        if period % review_time == 0 {
            quantity = (order_up_to_level - inventory).max(0);
        }

        let mut orders = Orders::default();
        orders.set(node.id.as_str(), quantity);
        Ok(orders)
    }
}

/// Multi-echelon (R,S): same review rule as [`SingleEchelonRS`], but
/// against the echelon inventory (this node plus everything reachable
/// downstream) instead of the node's own inventory.
///
/// `node.data` must carry `review_time`, `order_up_to_level`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiEchelonRS;

impl ControlStrategy for MultiEchelonRS {
    fn get_orders(&mut self, node: &Node, period: i64, chain: &dyn ChainQuery) -> SimResult<Orders> {
        let review_time = require_i64(node, "review_time")?;
        let order_up_to_level = require_i64(node, "order_up_to_level")?;
        let inventory = echelon_inventory(chain, &node.id);

        let mut quantity = 0;
        if period % review_time == 0 {
            quantity = (order_up_to_level - inventory).max(0);
        }

        let mut orders = Orders::default();
        orders.set(node.id.as_str(), quantity);
        Ok(orders)
    }
}
