//! End-to-end period scheduling across a four-node graph spanning two
//! echelons, two control-strategy review cadences, and a downward
//! shortage correction on release.

use indexmap::IndexMap;
use supplychain_sim::strategy::{Fractional, SingleEchelonRsQ};
use supplychain_sim::{Edge, LeadTime, Node, Orders, Pipeline, Receipt, RunConfig, Sales, Simulator, Stock, SupplyChain};

fn node_a() -> Node {
    let mut node = Node::new("A");
    node.data = serde_json::json!({
        "order_quantity": 30,
        "reorder_level": 25,
        "review_time": 1,
    })
    .as_object()
    .unwrap()
    .clone();
    node.sales = Sales::new(IndexMap::from([(1, vec![10]), (2, vec![10]), (3, vec![10])]));
    node.lead_time = LeadTime::with_default(1);
    node.stock = Stock::new("A", IndexMap::from([("A".to_string(), 15), ("C".to_string(), 5)])).unwrap();
    node
}

fn node_b() -> Node {
    let mut node = Node::new("B");
    node.data = serde_json::json!({
        "order_quantity": 25,
        "reorder_level": 40,
        "review_time": 1,
    })
    .as_object()
    .unwrap()
    .clone();
    node.sales = Sales::new(IndexMap::from([(1, vec![15]), (2, vec![15]), (3, vec![15])]));
    node.lead_time = LeadTime::with_default(2);
    node.pipeline = Pipeline::new(vec![Receipt::new("D", 1, 75)]);
    node.backorders = 5;
    node
}

fn node_c() -> Node {
    let mut node = Node::new("C");
    node.data = serde_json::json!({
        "order_quantity": 150,
        "reorder_level": 20,
        "review_time": 1,
    })
    .as_object()
    .unwrap()
    .clone();
    node.lead_time = LeadTime::new(IndexMap::from([(1, 3), (2, 7)]), Some(3));
    node.stock = Stock::new("C", IndexMap::from([("C".to_string(), 200)])).unwrap();
    node
}

fn node_d() -> Node {
    let mut node = Node::new("D");
    node.data = serde_json::json!({
        "order_quantity": 200,
        "reorder_level": 20,
        "review_time": 2,
    })
    .as_object()
    .unwrap()
    .clone();
    node.lead_time = LeadTime::with_default(4);
    node.orders = Orders::new(IndexMap::from([("B".to_string(), 15)]));
    node.stock = Stock::new("D", IndexMap::from([("D".to_string(), 40)])).unwrap();
    node.pipeline = Pipeline::new(vec![Receipt::new("D", 2, 200)]);
    node
}

#[test]
fn one_period_matches_the_reference_trajectory() {
    let edges = vec![
        Edge::new("C", "A", 2).unwrap(),
        Edge::new("D", "A", 1).unwrap(),
        Edge::new("D", "B", 3).unwrap(),
    ];
    let mut chain = SupplyChain::new(vec![node_a(), node_b(), node_c(), node_d()], edges).unwrap();

    assert_eq!(chain.node("A").unwrap().llc, 0);
    assert_eq!(chain.node("B").unwrap().llc, 0);
    assert_eq!(chain.node("C").unwrap().llc, 1);
    assert_eq!(chain.node("D").unwrap().llc, 1);

    let mut simulator = Simulator::new(Box::new(SingleEchelonRsQ), Box::new(Fractional));
    let config = RunConfig::single(1);
    simulator.run(&mut chain, &config).unwrap();

    let a = chain.node("A").unwrap();
    let receipts: Vec<_> = a.pipeline.iter().cloned().collect();
    assert_eq!(
        receipts,
        vec![Receipt::new("C", 1, 60), Receipt::new("D", 1, 7)]
    );
    assert_eq!(a.stock.get("A"), 5);
    assert_eq!(a.stock.get("C"), 5);
    assert_eq!(a.stock.get("D"), 0);
}
