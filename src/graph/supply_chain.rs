//! The supply-chain graph: node/edge ownership, echelon indexing, and the
//! cross-node operations a period's ordering phase drives.

use crate::error::{SimError, SimResult};
use crate::model::{Edge, Node, NodeRef, Orders, Receipt, StockView};
use crate::strategy::ChainQuery;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use tracing::debug;

/// A virtual per-node inventory snapshot. Unlike [`crate::model::Stock`]
/// this MAY hold negative entries, so it is kept as a distinct type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    data: IndexMap<String, i64>,
}

impl Inventory {
    pub fn get(&self, id: impl NodeRef) -> i64 {
        *self.data.get(id.node_ref()).unwrap_or(&0)
    }

    fn add(&mut self, id: impl NodeRef, delta: i64) {
        *self.data.entry(id.node_ref().to_string()).or_insert(0) += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.data.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl StockView for Inventory {
    fn quantity_of(&self, sku_id: &str) -> i64 {
        self.get(sku_id)
    }
}

/// Owns every [`Node`] and [`Edge`] in the graph and provides the
/// cross-node operations (`inventory`, `create_orders`, `release_orders`,
/// echelon indexing) that only make sense at the graph level.
#[derive(Debug, Clone, Default)]
pub struct SupplyChain {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
}

impl SupplyChain {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> SimResult<Self> {
        let mut chain = SupplyChain {
            nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            edges: edges.into_iter().map(|e| (e.id(), e)).collect(),
        };
        chain.wire_predecessors()?;
        chain.compute_llc();
        Ok(chain)
    }

    /// Attach every edge to its destination node's `predecessors`, unless
    /// the node already declares that edge itself (node-declared
    /// predecessors take precedence), and ensure every
    /// node-declared predecessor is also registered in the edge set.
    fn wire_predecessors(&mut self) -> SimResult<()> {
        let edges: Vec<Edge> = self.edges.values().cloned().collect();
        for edge in edges {
            if !self.node_exists(&edge.source) {
                return Err(SimError::InvalidGraph {
                    message: format!("edge {edge} defines unknown source node {}", edge.source),
                });
            }
            if !self.node_exists(&edge.destination) {
                return Err(SimError::InvalidGraph {
                    message: format!(
                        "edge {edge} defines unknown destination node {}",
                        edge.destination
                    ),
                });
            }
            let destination = self.nodes.get_mut(&edge.destination).expect("checked above");
            if !destination.predecessors.iter().any(|e| e.id() == edge.id()) {
                destination.predecessors.push(edge);
            }
        }

        // Node-declared predecessors are authoritative: resync the edge set
        // to match them even where a same-id edge was already registered.
        let mut to_register = Vec::new();
        for node in self.nodes.values() {
            for edge in &node.predecessors {
                if edge.destination != node.id {
                    return Err(SimError::InvalidGraph {
                        message: format!(
                            "node {} declares predecessor edge {edge} with mismatched destination",
                            node.id
                        ),
                    });
                }
                to_register.push(edge.clone());
            }
        }
        for edge in to_register {
            self.edges.insert(edge.id(), edge);
        }
        Ok(())
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.insert(edge.id(), edge);
    }

    pub fn node_exists(&self, id: impl NodeRef) -> bool {
        self.nodes.contains_key(id.node_ref())
    }

    pub fn edge_exists(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    pub fn node(&self, id: impl NodeRef) -> Option<&Node> {
        self.nodes.get(id.node_ref())
    }

    pub fn node_mut(&mut self, id: impl NodeRef) -> Option<&mut Node> {
        self.nodes.get_mut(id.node_ref())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Determine the low-level code for every node.
    ///
    /// Seeds a breadth-first walk upstream (through `predecessors`) from
    /// every intercompany node, taking `llc := max(llc, echelon_nr)` at
    /// each hop. A node left unvisited by any walk (a fully isolated
    /// supplier) is finalized to 0, so suppliers always end up with
    /// `llc >= 0` even in that degenerate case.
    pub fn compute_llc(&mut self) {
        let seeds: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.intercompany())
            .map(|n| n.id.clone())
            .collect();

        for seed in seeds {
            let mut echelon_nr = 0i64;
            let mut echelon: Vec<String> = vec![seed];

            while !echelon.is_empty() {
                let mut next: IndexSet<String> = IndexSet::new();
                for node_id in &echelon {
                    let node = self.nodes.get_mut(node_id).expect("node exists");
                    if echelon_nr > node.llc {
                        node.llc = echelon_nr;
                    }
                    for edge in node.predecessors.clone() {
                        next.insert(edge.source);
                    }
                }
                echelon_nr += 1;
                echelon = next.into_iter().collect();
            }
        }

        for node in self.nodes.values_mut() {
            if node.llc < 0 {
                node.llc = 0;
            }
        }
    }

    pub fn max_llc(&self) -> i64 {
        self.nodes.values().map(|n| n.llc).max().unwrap_or(0)
    }

    pub fn nodes_by_llc(&self, llc: i64) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.llc == llc)
    }

    /// Direct successors of `node_id`: nodes for which `node_id` appears as
    /// an edge source. Derived from the edge set rather than stored on
    /// `Node` (DESIGN.md, Open Question resolution 3).
    pub fn successors(&self, node_id: &str) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.source == node_id)
    }

    /// Virtual inventory snapshot for `node`. May contain negative entries.
    pub fn inventory(&self, node_id: &str) -> Inventory {
        let node = match self.node(node_id) {
            Some(n) => n,
            None => return Inventory::default(),
        };
        let mut inv = Inventory::default();

        for receipt in node.pipeline.iter() {
            inv.add(receipt.sku_code.as_str(), receipt.quantity);
        }

        for edge in &node.predecessors {
            if let Some(source) = self.node(edge.source.as_str()) {
                inv.add(edge.source.as_str(), source.orders.get(node_id));
            }
            inv.add(edge.source.as_str(), node.stock.get(edge.source.as_str()));
        }

        inv.add(node_id, node.stock.get(node_id));
        inv.add(node_id, -node.backorders);
        inv.add(node_id, -node.orders.sum());

        inv
    }

    /// Number of assemblies of `node` feasible from its virtual inventory.
    pub fn inventory_assemblies_feasible(&self, node_id: &str) -> i64 {
        let node = match self.node(node_id) {
            Some(n) => n,
            None => return 0,
        };
        let inv = self.inventory(node_id);
        let feasible = node.assemblies_feasible(Some(&inv));
        feasible + inv.get(node_id)
    }

    /// Place the orders a control strategy decided on.
    ///
    /// `orders` maps target node id -> quantity. A target equal to
    /// `node_id` itself means "produce/order for self": explode the BOM to
    /// predecessors (intercompany) or enqueue a supplier receipt. Any other
    /// target means "place an order at that node to be shipped to this
    /// node".
    pub fn create_orders(&mut self, node_id: &str, orders: &Orders, period: i64) -> SimResult<()> {
        let predecessors = match self.node(node_id) {
            Some(n) => n.predecessors.clone(),
            None => return Ok(()),
        };
        let intercompany = !predecessors.is_empty();

        for (target_id, qty) in orders.iter() {
            if qty <= 0 {
                continue;
            }
            if target_id == node_id {
                debug!(node = %node_id, qty, "creating orders");
                if intercompany {
                    for edge in &predecessors {
                        if let Some(source) = self.nodes.get_mut(&edge.source) {
                            source.orders.add(node_id, qty * edge.number);
                        }
                    }
                } else {
                    let lead_time = self.node(node_id).expect("checked above").get_lead_time(period)?;
                    let node = self.nodes.get_mut(node_id).expect("checked above");
                    node.pipeline.add(Receipt::new(node_id, lead_time, qty));
                }
            } else if let Some(target) = self.nodes.get_mut(target_id) {
                target.orders.add(node_id, qty);
            }
        }
        Ok(())
    }

    /// Release stock at `node_id` to the nodes a release strategy decided
    /// on. Quantities are clamped to available stock;
    /// zero-or-less releases are skipped so no empty pipeline entry is
    /// created.
    pub fn release_orders(
        &mut self,
        node_id: &str,
        releases: &Orders,
        period: i64,
    ) -> SimResult<()> {
        for (receiver_id, requested) in releases.iter() {
            let available = self
                .node(node_id)
                .map(|n| n.stock.get(node_id))
                .unwrap_or(0);
            let qty = requested.min(available);
            if qty <= 0 {
                continue;
            }
            let receiver_lead_time = match self.node(receiver_id) {
                Some(r) => r.get_lead_time(period)?,
                None => continue,
            };

            if let Some(receiver) = self.nodes.get_mut(receiver_id) {
                receiver.pipeline.add(Receipt::new(node_id, receiver_lead_time, qty));
            }
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.stock.add(node_id, -qty)?;
                node.orders.add(receiver_id, -qty);
            }
            debug!(node = %node_id, receiver = %receiver_id, qty, "released");
        }
        Ok(())
    }
}

impl ChainQuery for SupplyChain {
    fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn inventory_assemblies_feasible(&self, node_id: &str) -> i64 {
        SupplyChain::inventory_assemblies_feasible(self, node_id)
    }

    fn successor_ids(&self, node_id: &str) -> Vec<String> {
        self.successors(node_id).map(|e| e.destination.clone()).collect()
    }
}

/// Check the graph has no predecessor edge cycle reachable from `start`.
/// Not invoked automatically (behavior on cycles is otherwise undefined);
/// provided for callers who want to validate a parsed graph before
/// simulating it.
pub fn has_predecessor_cycle(chain: &SupplyChain, start: &str) -> bool {
    fn visit(chain: &SupplyChain, node_id: &str, visiting: &mut HashSet<String>, done: &mut HashSet<String>) -> bool {
        if done.contains(node_id) {
            return false;
        }
        if !visiting.insert(node_id.to_string()) {
            return true;
        }
        let cyclic = match chain.node(node_id) {
            Some(node) => node
                .predecessors
                .iter()
                .any(|e| visit(chain, &e.source, visiting, done)),
            None => false,
        };
        visiting.remove(node_id);
        done.insert(node_id.to_string());
        cyclic
    }

    let mut visiting = HashSet::new();
    let mut done = HashSet::new();
    visit(chain, start, &mut visiting, &mut done)
}
