//! Out-of-the-box `ReleaseStrategy` implementations.

use crate::error::SimResult;
use crate::model::{Node, Orders};
use crate::strategy::traits::{require_f64, ReleaseStrategy};

/// While total release exceeds stock, decrement the first (insertion-order)
/// line currently carrying the largest release quantity. Ties are broken by
/// "first" to keep the correction deterministic across runs.
fn correct_downward(mut release: Orders, stock: i64) -> Orders {
    while release.sum() > stock {
        let mut max_key: Option<String> = None;
        let mut max_value = i64::MIN;
        for (key, value) in release.iter() {
            if value > max_value {
                max_value = value;
                max_key = Some(key.to_string());
            }
        }
        match max_key {
            Some(key) => release.add(key.as_str(), -1),
            None => break,
        }
    }
    release
}

/// Default allocation: shrink each order line proportionally to its share
/// of the total shortage.
///
/// Guarantees: `0 <= release[k] <= orders[k]`,
/// `sum(release) <= stock`, and `release == orders` whenever total demand
/// fits in stock.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fractional;

impl ReleaseStrategy for Fractional {
    fn get_releases(&mut self, node: &Node) -> SimResult<Orders> {
        let stock = node.stock.get(node.id.as_str());
        let total: i64 = node.orders.sum();

        if total == 0 {
            return Ok(Orders::default());
        }

        let shortage = (total - stock).max(0);
        let mut release = Orders::default();
        for (key, quantity) in node.orders.iter() {
            let value = quantity as f64 - (shortage as f64 * quantity as f64 / total as f64);
            release.set(key, value.ceil() as i64);
        }

        Ok(correct_downward(release, stock))
    }
}

/// Alternative allocation parameterized by a fixed `allocation_fraction`
/// in `node.data` instead of deriving the fraction from each line's share
/// of the total.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationFraction;

impl ReleaseStrategy for AllocationFraction {
    fn get_releases(&mut self, node: &Node) -> SimResult<Orders> {
        let stock = node.stock.get(node.id.as_str());
        let total: i64 = node.orders.sum();

        if total == 0 {
            return Ok(Orders::default());
        }

        let allocation_fraction = require_f64(node, "allocation_fraction")?;
        let shortage = (total - stock).max(0);
        let mut release = Orders::default();
        for (key, quantity) in node.orders.iter() {
            let value = quantity as f64 - (shortage as f64 * allocation_fraction);
            release.set(key, value.ceil() as i64);
        }

        Ok(correct_downward(release, stock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stock;
    use indexmap::IndexMap;

    fn node_with_orders_and_stock(stock: i64, orders: &[(&str, i64)]) -> Node {
        let mut node = Node::new("A");
        node.stock = Stock::new("A", IndexMap::from([("A".to_string(), stock)])).unwrap();
        node.orders = Orders::new(orders.iter().map(|(k, v)| (k.to_string(), *v)).collect());
        node
    }

    #[test]
    fn fractional_releases_orders_unchanged_when_feasible() {
        let node = node_with_orders_and_stock(70, &[("A", 20), ("B", 40)]);
        let releases = Fractional.get_releases(&node).unwrap();
        assert_eq!(releases.get("A"), 20);
        assert_eq!(releases.get("B"), 40);
    }

    #[test]
    fn fractional_shortage_matches_reference_fixture() {
        let node = node_with_orders_and_stock(7, &[("A", 20), ("B", 40)]);
        let releases = Fractional.get_releases(&node).unwrap();
        assert_eq!(releases.get("A"), 3);
        assert_eq!(releases.get("B"), 4);
        assert_eq!(releases.get("A") + releases.get("B"), 7);
    }

    #[test]
    fn fractional_no_order_releases_nothing() {
        let node = node_with_orders_and_stock(7, &[("A", 0), ("B", 0)]);
        let releases = Fractional.get_releases(&node).unwrap();
        assert!(releases.is_empty());
    }

    #[test]
    fn fractional_never_exceeds_stock_or_per_line_order() {
        let node = node_with_orders_and_stock(11, &[("A", 5), ("B", 5), ("C", 5)]);
        let releases = Fractional.get_releases(&node).unwrap();
        let total: i64 = releases.iter().map(|(_, v)| v).sum();
        assert!(total <= 11);
        for (key, value) in releases.iter() {
            assert!(value >= 0);
            assert!(value <= node.orders.get(key));
        }
    }

    #[test]
    fn allocation_fraction_uses_fixed_fraction() {
        let mut node = node_with_orders_and_stock(7, &[("A", 20), ("B", 40)]);
        node.data = serde_json::json!({"allocation_fraction": 0.5}).as_object().unwrap().clone();
        let releases = AllocationFraction.get_releases(&node).unwrap();
        assert!(releases.sum() <= 7);
        for (key, value) in releases.iter() {
            assert!(value <= node.orders.get(key));
        }
    }
}
