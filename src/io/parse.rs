//! JSON (de)serialization of a [`SupplyChain`].
//!
//! `sales` accepts either a list-of-lists (1-indexed by position) or a
//! period-keyed object; `lead_time` accepts a bare integer (becomes the
//! default) or `{queue, default}`; `stock`/`orders` are plain
//! `id -> quantity` objects. The serializer is the parser's inverse, so
//! parsing and serializing round-trip.

use crate::error::{SimError, SimResult};
use crate::graph::SupplyChain;
use crate::model::{Edge, LeadTime, Node, Orders, Pipeline, Receipt, Sales, Stock};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Parse a [`SupplyChain`] from a JSON string.
pub fn from_json_str(json_data: &str) -> SimResult<SupplyChain> {
    let value: Value = serde_json::from_str(json_data).map_err(|e| SimError::Parse {
        message: format!("invalid JSON: {e}"),
    })?;
    from_json_value(&value)
}

/// Parse a [`SupplyChain`] from a JSON file on disk.
pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<SupplyChain> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(|e| SimError::Parse {
        message: format!("failed to read {}: {e}", path.as_ref().display()),
    })?;
    from_json_str(&text)
}

/// Parse a [`SupplyChain`] from an already-decoded [`Value`].
pub fn from_json_value(value: &Value) -> SimResult<SupplyChain> {
    let root = value.as_object().ok_or_else(|| SimError::Parse {
        message: "root JSON value must be an object".to_string(),
    })?;

    let nodes = match root.get("nodes") {
        Some(Value::Array(items)) => items.iter().map(parse_node).collect::<SimResult<Vec<_>>>()?,
        Some(_) => return Err(SimError::Parse { message: "`nodes` must be an array".into() }),
        None => Vec::new(),
    };
    let edges = match root.get("edges") {
        Some(Value::Array(items)) => items.iter().map(parse_edge).collect::<SimResult<Vec<_>>>()?,
        Some(_) => return Err(SimError::Parse { message: "`edges` must be an array".into() }),
        None => Vec::new(),
    };

    SupplyChain::new(nodes, edges)
}

fn parse_node(raw: &Value) -> SimResult<Node> {
    let obj = raw.as_object().ok_or_else(|| SimError::Parse {
        message: "node must be an object".to_string(),
    })?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::Parse {
            message: "node is missing a string `id`".to_string(),
        })?
        .to_string();

    let mut node = Node::new(id.clone());

    if let Some(data) = obj.get("data") {
        node.data = data
            .as_object()
            .cloned()
            .ok_or_else(|| SimError::Parse {
                message: format!("node {id}: `data` must be an object"),
            })?;
    }

    if let Some(value) = obj.get("backorders") {
        node.backorders = value.as_i64().ok_or_else(|| SimError::Parse {
            message: format!("node {id}: `backorders` must be an integer"),
        })?;
    }

    if let Some(value) = obj.get("sales") {
        if !value.is_null() {
            node.sales = parse_sales(&id, value)?;
        }
    }

    if let Some(value) = obj.get("lead_time") {
        if !value.is_null() {
            node.lead_time = parse_lead_time(&id, value)?;
        }
    }

    if let Some(value) = obj.get("pipeline") {
        if !value.is_null() {
            node.pipeline = parse_pipeline(&id, value)?;
        }
    }

    if let Some(value) = obj.get("stock") {
        if !value.is_null() {
            node.stock = parse_stock(&id, value)?;
        }
    }

    if let Some(value) = obj.get("orders") {
        if !value.is_null() {
            node.orders = parse_orders(&id, value)?;
        }
    }

    if let Some(value) = obj.get("predecessors") {
        if !value.is_null() {
            let items = value.as_array().ok_or_else(|| SimError::Parse {
                message: format!("node {id}: `predecessors` must be an array"),
            })?;
            node.predecessors = items.iter().map(parse_edge).collect::<SimResult<Vec<_>>>()?;
        }
    }

    Ok(node)
}

fn parse_edge(raw: &Value) -> SimResult<Edge> {
    let obj = raw.as_object().ok_or_else(|| SimError::Parse {
        message: "edge must be an object".to_string(),
    })?;
    let source = obj
        .get("source")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::Parse {
            message: "edge is missing a string `source`".to_string(),
        })?;
    let destination = obj
        .get("destination")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::Parse {
            message: "edge is missing a string `destination`".to_string(),
        })?;
    let number = obj
        .get("number")
        .and_then(Value::as_i64)
        .ok_or_else(|| SimError::Parse {
            message: format!("edge {source}->{destination} is missing an integer `number`"),
        })?;
    Edge::new(source, destination, number)
}

/// Accept either `[[line, ...], ...]` (1-indexed by position) or
/// `{"period": [line, ...]}`.
fn parse_sales(node_id: &str, value: &Value) -> SimResult<Sales> {
    let mut data = IndexMap::new();
    match value {
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                data.insert((idx + 1) as i64, parse_int_array(node_id, "sales", item)?);
            }
        }
        Value::Object(obj) => {
            for (key, item) in obj {
                let period = parse_period_key(node_id, "sales", key)?;
                data.insert(period, parse_int_array(node_id, "sales", item)?);
            }
        }
        _ => {
            return Err(SimError::Parse {
                message: format!("node {node_id}: `sales` must be a list or object"),
            })
        }
    }
    Ok(Sales::new(data))
}

/// Accept a bare integer (becomes the default), or
/// `{"queue": list|object, "default": int}`.
fn parse_lead_time(node_id: &str, value: &Value) -> SimResult<LeadTime> {
    match value {
        Value::Number(_) => {
            let default = value.as_i64().ok_or_else(|| SimError::Parse {
                message: format!("node {node_id}: `lead_time` must be an integer"),
            })?;
            Ok(LeadTime::with_default(default))
        }
        Value::Object(obj) => {
            let default = match obj.get("default") {
                Some(v) if !v.is_null() => Some(v.as_i64().ok_or_else(|| SimError::Parse {
                    message: format!("node {node_id}: `lead_time.default` must be an integer"),
                })?),
                _ => None,
            };

            let mut queue = IndexMap::new();
            match obj.get("queue") {
                Some(Value::Array(items)) => {
                    for (idx, item) in items.iter().enumerate() {
                        let v = item.as_i64().ok_or_else(|| SimError::Parse {
                            message: format!("node {node_id}: `lead_time.queue` entries must be integers"),
                        })?;
                        queue.insert((idx + 1) as i64, v);
                    }
                }
                Some(Value::Object(qobj)) => {
                    for (key, item) in qobj {
                        let period = parse_period_key(node_id, "lead_time.queue", key)?;
                        let v = item.as_i64().ok_or_else(|| SimError::Parse {
                            message: format!("node {node_id}: `lead_time.queue` entries must be integers"),
                        })?;
                        queue.insert(period, v);
                    }
                }
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(SimError::Parse {
                        message: format!("node {node_id}: `lead_time.queue` must be a list or object"),
                    })
                }
            }
            Ok(LeadTime::new(queue, default))
        }
        _ => Err(SimError::Parse {
            message: format!("node {node_id}: `lead_time` must be an integer or an object"),
        }),
    }
}

fn parse_pipeline(node_id: &str, value: &Value) -> SimResult<Pipeline> {
    let items = value.as_array().ok_or_else(|| SimError::Parse {
        message: format!("node {node_id}: `pipeline` must be an array"),
    })?;
    let mut receipts = Vec::with_capacity(items.len());
    for item in items {
        let obj = item.as_object().ok_or_else(|| SimError::Parse {
            message: format!("node {node_id}: pipeline entries must be objects"),
        })?;
        let sku_code = obj
            .get("sku_code")
            .and_then(Value::as_str)
            .ok_or_else(|| SimError::Parse {
                message: format!("node {node_id}: pipeline entry is missing a string `sku_code`"),
            })?;
        let eta = obj.get("eta").and_then(Value::as_i64).ok_or_else(|| SimError::Parse {
            message: format!("node {node_id}: pipeline entry is missing an integer `eta`"),
        })?;
        let quantity = obj
            .get("quantity")
            .and_then(Value::as_i64)
            .ok_or_else(|| SimError::Parse {
                message: format!("node {node_id}: pipeline entry is missing an integer `quantity`"),
            })?;
        receipts.push(Receipt::new(sku_code, eta, quantity));
    }
    Ok(Pipeline::new(receipts))
}

fn parse_stock(node_id: &str, value: &Value) -> SimResult<Stock> {
    let map = parse_string_int_map(node_id, "stock", value)?;
    Stock::new(node_id, map).map_err(|e| SimError::Parse {
        message: format!("node {node_id}: {e}"),
    })
}

fn parse_orders(node_id: &str, value: &Value) -> SimResult<Orders> {
    let map = parse_string_int_map(node_id, "orders", value)?;
    Ok(Orders::new(map))
}

fn parse_string_int_map(node_id: &str, field: &str, value: &Value) -> SimResult<IndexMap<String, i64>> {
    let obj = value.as_object().ok_or_else(|| SimError::Parse {
        message: format!("node {node_id}: `{field}` must be an object"),
    })?;
    let mut map = IndexMap::new();
    for (key, v) in obj {
        let qty = v.as_i64().ok_or_else(|| SimError::Parse {
            message: format!("node {node_id}: `{field}.{key}` must be an integer"),
        })?;
        map.insert(key.clone(), qty);
    }
    Ok(map)
}

fn parse_int_array(node_id: &str, field: &str, value: &Value) -> SimResult<Vec<i64>> {
    let items = value.as_array().ok_or_else(|| SimError::Parse {
        message: format!("node {node_id}: `{field}` entries must be arrays of integers"),
    })?;
    items
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| SimError::Parse {
                message: format!("node {node_id}: `{field}` entries must be arrays of integers"),
            })
        })
        .collect()
}

fn parse_period_key(node_id: &str, field: &str, key: &str) -> SimResult<i64> {
    key.parse::<i64>().map_err(|_| SimError::Parse {
        message: format!("node {node_id}: `{field}` key `{key}` is not a valid period"),
    })
}

/// Serialize `chain` to a [`Value`] using the same node/edge shape
/// `from_json_value` accepts, with `llc` and `predecessors` added to
/// each node.
pub fn to_json_value(chain: &SupplyChain) -> Value {
    let nodes: Vec<Value> = chain.nodes().map(node_to_json).collect();
    let edges: Vec<Value> = chain.edges().map(edge_to_json).collect();
    json!({ "nodes": nodes, "edges": edges })
}

/// Serialize `chain` to a pretty-printed JSON string.
pub fn to_json_string(chain: &SupplyChain) -> SimResult<String> {
    serde_json::to_string_pretty(&to_json_value(chain)).map_err(|e| SimError::Parse {
        message: format!("failed to serialize supply chain: {e}"),
    })
}

/// Serialize `chain` and write it to `path`.
pub fn to_json_file(chain: &SupplyChain, path: impl AsRef<Path>) -> SimResult<()> {
    let text = to_json_string(chain)?;
    std::fs::write(path.as_ref(), text).map_err(|e| SimError::Parse {
        message: format!("failed to write {}: {e}", path.as_ref().display()),
    })
}

fn node_to_json(node: &Node) -> Value {
    json!({
        "id": node.id,
        "llc": node.llc,
        "backorders": node.backorders,
        "data": Value::Object(node.data.clone()),
        "sales": sales_to_json(&node.sales),
        "lead_time": lead_time_to_json(&node.lead_time),
        "orders": orders_to_json(&node.orders),
        "pipeline": pipeline_to_json(&node.pipeline),
        "predecessors": node.predecessors.iter().map(edge_to_json).collect::<Vec<_>>(),
        "stock": stock_to_json(&node.stock),
    })
}

fn edge_to_json(edge: &Edge) -> Value {
    json!({
        "source": edge.source,
        "destination": edge.destination,
        "number": edge.number,
    })
}

fn sales_to_json(sales: &Sales) -> Value {
    let mut out = Map::new();
    for (period, lines) in sales.iter() {
        out.insert(period.to_string(), json!(lines));
    }
    Value::Object(out)
}

fn lead_time_to_json(lead_time: &LeadTime) -> Value {
    let mut out = Map::new();
    let mut queue = Map::new();
    for (period, value) in lead_time.queue_entries() {
        queue.insert(period.to_string(), json!(value));
    }
    if !queue.is_empty() {
        out.insert("queue".to_string(), Value::Object(queue));
    }
    if let Some(default) = lead_time.default_value() {
        out.insert("default".to_string(), json!(default));
    }
    Value::Object(out)
}

fn orders_to_json(orders: &Orders) -> Value {
    let mut out = Map::new();
    for (key, qty) in orders.iter() {
        out.insert(key.to_string(), json!(qty));
    }
    Value::Object(out)
}

fn stock_to_json(stock: &Stock) -> Value {
    let mut out = Map::new();
    for (key, qty) in stock.iter() {
        out.insert(key.to_string(), json!(qty));
    }
    Value::Object(out)
}

fn pipeline_to_json(pipeline: &Pipeline) -> Value {
    Value::Array(
        pipeline
            .iter()
            .map(|r| {
                json!({
                    "sku_code": r.sku_code,
                    "eta": r.eta,
                    "quantity": r.quantity,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_node() {
        let chain = from_json_str(r#"{"nodes": [{"id": "A"}]}"#).unwrap();
        let node = chain.node("A").unwrap();
        assert_eq!(node.backorders, 0);
        assert!(node.predecessors.is_empty());
        assert_eq!(node.stock.get("A"), 0);
    }

    #[test]
    fn parses_full_reference_fixture() {
        let json_data = r#"
        {
            "nodes": [
                {
                    "id": "A",
                    "sales": [[1, 2, 3], [4]],
                    "lead_time": {"queue": [1, 2, 3, 4]},
                    "backorders": 5,
                    "pipeline": [{"sku_code": "B", "eta": 2, "quantity": 5}],
                    "stock": {"A": 42, "B": 24},
                    "orders": {"A": 43, "B": 25}
                },
                {
                    "id": "B",
                    "sales": {"1": [5, 6, 7], "2": [8]},
                    "lead_time": {"queue": {"1": 5, "2": 6}, "default": 42}
                }
            ],
            "edges": [{"source": "B", "destination": "A", "number": 42}]
        }
        "#;

        let chain = from_json_str(json_data).unwrap();
        assert!(chain.node_exists("A"));
        assert!(chain.node_exists("B"));
        assert!(chain.edge_exists("B->A"));

        let a = chain.node("A").unwrap();
        assert_eq!(a.predecessors[0].number, 42);
        assert_eq!(a.sales.clone().pop(1), vec![1, 2, 3]);
        assert_eq!(a.backorders, 5);
        assert_eq!(a.stock.get("A"), 42);
        assert_eq!(a.orders.get("B"), 25);
        assert_eq!(a.lead_time.get(1).unwrap(), 1);

        let b = chain.node("B").unwrap();
        assert!(b.predecessors.is_empty());
        assert_eq!(b.lead_time.get(1).unwrap(), 5);
        assert_eq!(b.lead_time.get(5).unwrap(), 42);
    }

    #[test]
    fn lead_time_bare_integer_becomes_default() {
        let chain = from_json_str(r#"{"nodes": [{"id": "A", "lead_time": 6}]}"#).unwrap();
        assert_eq!(chain.node("A").unwrap().lead_time.get(66).unwrap(), 6);
    }

    #[test]
    fn missing_id_is_a_parse_error() {
        assert!(matches!(
            from_json_str(r#"{"nodes": [{"backorders": 4}]}"#),
            Err(SimError::Parse { .. })
        ));
    }

    #[test]
    fn wrong_id_type_is_a_parse_error() {
        assert!(matches!(
            from_json_str(r#"{"nodes": [{"id": 4}]}"#),
            Err(SimError::Parse { .. })
        ));
    }

    #[test]
    fn negative_edge_number_is_rejected() {
        let json_data = r#"{"nodes": [{"id": "A"}, {"id": "B"}],
            "edges": [{"source": "A", "destination": "B", "number": 0}]}"#;
        assert!(from_json_str(json_data).is_err());
    }

    #[test]
    fn round_trip_preserves_structure() {
        let json_data = r#"
        {
            "nodes": [
                {"id": "A", "sales": [[2]], "lead_time": {"default": 14},
                 "orders": {"B": 12}, "stock": {"A": 100, "B": 3}},
                {"id": "B", "lead_time": {"queue": {"1": 13}, "default": 4},
                 "pipeline": [{"sku_code": "A", "eta": 3, "quantity": 3}]}
            ],
            "edges": [{"source": "A", "destination": "B", "number": 2}]
        }
        "#;

        let chain = from_json_str(json_data).unwrap();
        let serialized = to_json_string(&chain).unwrap();
        let reparsed = from_json_str(&serialized).unwrap();
        let reserialized = to_json_string(&reparsed).unwrap();
        assert_eq!(serialized, reserialized);

        let a = reparsed.node("A").unwrap();
        assert_eq!(a.stock.get("A"), 100);
        assert_eq!(a.orders.get("B"), 12);
        let b = reparsed.node("B").unwrap();
        assert_eq!(b.lead_time.get(1).unwrap(), 13);
        assert_eq!(b.lead_time.get(2).unwrap(), 4);
    }
}
