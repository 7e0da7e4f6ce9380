//! Core of a discrete-time, multi-echelon supply-chain simulator.
//!
//! Advances a DAG of [`model::Node`]s one period at a time: receipts
//! arrive, nodes assemble from predecessor stock, backorders and sales
//! are satisfied, pipelines age, and — in ascending echelon order — each
//! node's [`strategy::ControlStrategy`] decides what to order and its
//! [`strategy::ReleaseStrategy`] decides what to ship.

pub mod error;
pub mod graph;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{SimError, SimResult};
pub use graph::SupplyChain;
pub use model::{Edge, LeadTime, Node, Orders, Pipeline, Receipt, Sales, Stock};
pub use simulation::config::RunConfig;
pub use simulation::engine::Simulator;
