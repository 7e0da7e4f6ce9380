//! Three-period trajectory of an isolated (R,s,Q)-controlled supplier:
//! demand draws stock down, backorders accumulate once stock is
//! exhausted, and a single replenishment order is placed once inventory
//! (stock plus in-transit pipeline, minus backorders) first dips below
//! the reorder level.

use indexmap::IndexMap;
use supplychain_sim::strategy::{Fractional, SingleEchelonRsQ};
use supplychain_sim::{LeadTime, Node, RunConfig, Sales, Simulator, Stock, SupplyChain};

fn single_supplier() -> SupplyChain {
    let mut node = Node::new("A");
    node.data = serde_json::json!({
        "order_quantity": 10,
        "reorder_level": 5,
        "review_time": 1,
    })
    .as_object()
    .unwrap()
    .clone();
    node.sales = Sales::new(IndexMap::from([(1, vec![3]), (2, vec![4]), (3, vec![2])]));
    node.lead_time = LeadTime::with_default(2);
    node.stock = Stock::new("A", IndexMap::from([("A".to_string(), 5)])).unwrap();
    SupplyChain::new(vec![node], vec![]).unwrap()
}

#[test]
fn backorders_accumulate_once_a_single_replenishment_is_in_transit() {
    let mut chain = single_supplier();
    let mut simulator = Simulator::new(Box::new(SingleEchelonRsQ), Box::new(Fractional));
    simulator.run(&mut chain, &RunConfig::single(3)).unwrap();

    let node = chain.node("A").unwrap();
    assert_eq!(node.stock.get("A"), 0);
    assert_eq!(node.backorders, 4);

    let receipts: Vec<_> = node.pipeline.iter().cloned().collect();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].sku_code, "A");
    assert_eq!(receipts[0].quantity, 10);
    assert_eq!(receipts[0].eta, 0);
}
