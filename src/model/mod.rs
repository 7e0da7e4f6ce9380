//! Graph-independent building blocks: edges, receipts/pipeline, lead
//! times, sales, and per-node state.

pub mod edge;
pub mod leadtime;
pub mod node;
pub mod receipt;
pub mod sales;

pub use edge::Edge;
pub use leadtime::{LeadTime, LeadTimeStrategy};
pub use node::{Node, NodeData, NodeRef, Orders, SalesOutcome, Stock, StockView};
pub use receipt::{Pipeline, Receipt};
pub use sales::{Sales, SalesStrategy};
