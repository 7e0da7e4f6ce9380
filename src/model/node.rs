//! Per-node state and the local operations a period's phases drive.

use crate::error::{SimError, SimResult};
use crate::model::edge::Edge;
use crate::model::leadtime::{LeadTime, LeadTimeStrategy};
use crate::model::receipt::Pipeline;
use crate::model::sales::{Sales, SalesStrategy};
use indexmap::IndexMap;
use serde_json::Map as JsonMap;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Arbitrary strategy-parameter bag attached to a node. Opaque to the
/// core; strategies pull out (and validate) the fields they need.
pub type NodeData = JsonMap<String, JsonValue>;

/// Something that can stand in for a node id when indexing `Stock`/`Orders`,
/// so callers can pass either a borrowed id or an owned `Node`.
pub trait NodeRef {
    fn node_ref(&self) -> &str;
}

impl NodeRef for str {
    fn node_ref(&self) -> &str {
        self
    }
}

impl NodeRef for String {
    fn node_ref(&self) -> &str {
        self.as_str()
    }
}

impl NodeRef for Node {
    fn node_ref(&self) -> &str {
        &self.id
    }
}

impl<T: NodeRef + ?Sized> NodeRef for &T {
    fn node_ref(&self) -> &str {
        (*self).node_ref()
    }
}

/// A read-only view over SKU quantities, used so [`Node::assemblies_feasible`]
/// can be evaluated either against the node's real stock or against a
/// virtual inventory projection (which may contain negative entries).
pub trait StockView {
    fn quantity_of(&self, sku_id: &str) -> i64;
}

/// Stock levels at a node. Missing keys read as zero; direct sets that
/// would leave a level negative are rejected (`SimError::NegativeStock`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stock {
    node_id: String,
    data: IndexMap<String, i64>,
}

impl Stock {
    pub fn new(node_id: impl Into<String>, data: IndexMap<String, i64>) -> SimResult<Self> {
        let node_id = node_id.into();
        for (sku_id, qty) in &data {
            if *qty < 0 {
                return Err(SimError::NegativeStock {
                    node_id: node_id.clone(),
                    sku_id: sku_id.clone(),
                    attempted: *qty,
                });
            }
        }
        Ok(Self { node_id, data })
    }

    pub fn get(&self, sku: impl NodeRef) -> i64 {
        *self.data.get(sku.node_ref()).unwrap_or(&0)
    }

    /// Set the stock level for `sku`, rejecting negative values.
    pub fn set(&mut self, sku: impl NodeRef, value: i64) -> SimResult<()> {
        let sku_id = sku.node_ref().to_string();
        if value < 0 {
            return Err(SimError::NegativeStock {
                node_id: self.node_id.clone(),
                sku_id,
                attempted: value,
            });
        }
        self.data.insert(sku_id, value);
        Ok(())
    }

    /// Add (possibly negative) `delta` to the stock level for `sku`,
    /// rejecting the change if it would drive the level negative.
    pub fn add(&mut self, sku: impl NodeRef, delta: i64) -> SimResult<()> {
        let new_value = self.get(sku.node_ref()) + delta;
        self.set(sku.node_ref(), new_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl StockView for Stock {
    fn quantity_of(&self, sku_id: &str) -> i64 {
        self.get(sku_id)
    }
}

/// Outstanding demand placed on a node, keyed by the requesting node id.
/// Missing keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orders {
    data: IndexMap<String, i64>,
}

impl Orders {
    pub fn new(data: IndexMap<String, i64>) -> Self {
        Self { data }
    }

    pub fn get(&self, target: impl NodeRef) -> i64 {
        *self.data.get(target.node_ref()).unwrap_or(&0)
    }

    pub fn set(&mut self, target: impl NodeRef, value: i64) {
        self.data.insert(target.node_ref().to_string(), value);
    }

    pub fn add(&mut self, target: impl NodeRef, delta: i64) {
        let new_value = self.get(target.node_ref()) + delta;
        self.set(target.node_ref(), new_value);
    }

    pub fn sum(&self) -> i64 {
        self.data.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, i64)> for Orders {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// Result of applying one period's sales to a node, carried back to the
/// caller so the metrics layer can emit the sales-satisfaction events
/// without re-deriving them from a before/after diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesOutcome {
    pub demand: i64,
    pub satisfied: i64,
    pub backordered: i64,
    pub lines_total: usize,
    pub lines_satisfied: usize,
    pub lines_backordered: usize,
}

/// A single SKU's state and local behavior within the supply chain.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub data: NodeData,
    pub sales: Sales,
    pub lead_time: LeadTime,
    pub llc: i64,
    pub backorders: i64,
    pub predecessors: Vec<Edge>,
    pub pipeline: Pipeline,
    pub stock: Stock,
    pub orders: Orders,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            stock: Stock::new(id.clone(), IndexMap::new()).expect("empty stock is valid"),
            id,
            data: NodeData::new(),
            sales: Sales::default(),
            lead_time: LeadTime::default(),
            llc: -1,
            backorders: 0,
            predecessors: Vec::new(),
            pipeline: Pipeline::default(),
            orders: Orders::default(),
        }
    }

    /// Has predecessors: is assembled from upstream SKUs.
    pub fn intercompany(&self) -> bool {
        !self.predecessors.is_empty()
    }

    /// Has no predecessors: sourced externally.
    pub fn supplier(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Number of units of `self` that could be assembled right now.
    ///
    /// Evaluated against `self.stock` unless a different [`StockView`] is
    /// supplied (used to evaluate feasibility against a virtual inventory
    /// projection instead, as `SupplyChain::inventory_assemblies_feasible` does).
    pub fn assemblies_feasible(&self, stock: Option<&dyn StockView>) -> i64 {
        if !self.intercompany() {
            return 0;
        }
        let view: &dyn StockView = stock.unwrap_or(&self.stock);
        let feasible = self
            .predecessors
            .iter()
            .map(|edge| view.quantity_of(&edge.source) / edge.number)
            .min()
            .unwrap_or(0);

        if feasible < 0 {
            tracing::warn!(node = %self.id, "found negative feasible assemblies");
        }
        feasible.max(0)
    }

    /// Move receipts whose ETA has elapsed from the pipeline into stock.
    pub fn satisfy_received_receipts(&mut self) -> SimResult<()> {
        let received = self.pipeline.pop_received();
        debug!(node = %self.id, count = received.len(), "receipts received");
        for receipt in received {
            self.stock.add(receipt.sku_code.as_str(), receipt.quantity)?;
        }
        Ok(())
    }

    /// Satisfy as many outstanding backorders as stock allows.
    pub fn satisfy_backorders(&mut self) -> SimResult<()> {
        if self.backorders == 0 {
            return Ok(());
        }
        let feasible = self.stock.get(self.id.as_str()).min(self.backorders);
        debug!(node = %self.id, feasible, total = self.backorders, "backorders satisfied");
        self.backorders -= feasible;
        self.stock.add(self.id.as_str(), -feasible)?;
        Ok(())
    }

    /// Satisfy this period's sales from stock, backordering the remainder.
    pub fn satisfy_sales(&mut self, period: i64) -> SimResult<SalesOutcome> {
        let lines = self.sales.pop_sales(period);
        let demand: i64 = lines.iter().sum();
        let feasible = self.stock.get(self.id.as_str()).min(demand);
        let backordered = demand - feasible;

        self.stock.add(self.id.as_str(), -feasible)?;
        self.backorders += backordered;

        let mut lines_satisfied = 0usize;
        let mut running = 0i64;
        for &line in &lines {
            if running + line > feasible {
                break;
            }
            running += line;
            lines_satisfied += 1;
        }

        debug!(
            node = %self.id,
            feasible,
            demand,
            backordered,
            "sales satisfied"
        );

        Ok(SalesOutcome {
            demand,
            satisfied: feasible,
            backordered,
            lines_total: lines.len(),
            lines_satisfied,
            lines_backordered: lines.len() - lines_satisfied,
        })
    }

    /// Assemble as many units of `self` as predecessor stock allows.
    pub fn assemble(&mut self) -> SimResult<()> {
        let feasible = self.assemblies_feasible(None);
        for edge in self.predecessors.clone() {
            self.stock.add(edge.source.as_str(), -(feasible * edge.number))?;
        }
        self.stock.add(self.id.as_str(), feasible)?;
        debug!(node = %self.id, feasible, "assembled");
        Ok(())
    }

    pub fn get_lead_time(&self, period: i64) -> SimResult<i64> {
        self.lead_time.get_lead_time(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_stock(id: &str, stock: &[(&str, i64)]) -> Node {
        let mut node = Node::new(id);
        node.stock = Stock::new(
            id,
            stock.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
        .unwrap();
        node
    }

    #[test]
    fn assemblies_feasible_takes_the_min_ratio() {
        let mut node = node_with_stock("A", &[("A", 100), ("B", 20), ("C", 2)]);
        node.predecessors = vec![Edge::new("B", "A", 1).unwrap(), Edge::new("C", "A", 2).unwrap()];
        assert_eq!(node.assemblies_feasible(None), 1);
    }

    #[test]
    fn assemble_consumes_predecessors() {
        let mut node = node_with_stock("A", &[("A", 100), ("B", 20), ("C", 2)]);
        node.predecessors = vec![Edge::new("B", "A", 1).unwrap(), Edge::new("C", "A", 2).unwrap()];
        node.assemble().unwrap();
        assert_eq!(node.stock.get("A"), 101);
        assert_eq!(node.stock.get("B"), 19);
        assert_eq!(node.stock.get("C"), 0);
    }

    #[test]
    fn satisfy_backorders_partial() {
        let mut node = node_with_stock("A", &[("A", 100), ("B", 20)]);
        node.backorders = 140;
        node.satisfy_backorders().unwrap();
        assert_eq!(node.backorders, 40);
        assert_eq!(node.stock.get("A"), 0);
        assert_eq!(node.stock.get("B"), 20);
    }

    #[test]
    fn satisfy_sales_partial_reports_backordered_lines() {
        let mut node = node_with_stock("A", &[("A", 3)]);
        node.sales = Sales::new(IndexMap::from([(1, vec![2, 2])]));
        let outcome = node.satisfy_sales(1).unwrap();
        assert_eq!(outcome.satisfied, 3);
        assert_eq!(outcome.backordered, 1);
        assert_eq!(outcome.lines_satisfied, 1);
        assert_eq!(outcome.lines_backordered, 1);
        assert_eq!(node.backorders, 1);
        assert_eq!(node.stock.get("A"), 0);
    }

    #[test]
    fn satisfy_received_receipts_only_pops_due() {
        use crate::model::receipt::Receipt;
        let mut node = node_with_stock("A", &[("A", 10), ("B", 0), ("C", 3)]);
        node.pipeline = Pipeline::new(vec![
            Receipt::new("A", 0, 8),
            Receipt::new("B", 0, 9),
            Receipt::new("A", 8, 10),
        ]);
        node.satisfy_received_receipts().unwrap();
        assert_eq!(node.stock.get("A"), 18);
        assert_eq!(node.stock.get("B"), 9);
        assert_eq!(node.stock.get("C"), 3);
        assert_eq!(node.pipeline.iter().count(), 1);
    }

    #[test]
    fn stock_rejects_negative_set() {
        let mut stock = Stock::new("A", IndexMap::new()).unwrap();
        stock.set("A", 0).unwrap();
        assert!(stock.add("A", -1).is_err());
    }
}
