//! Error kinds for the supply-chain core.

use thiserror::Error;

/// All ways the core can fail, each carrying the offending id/period.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("invalid graph: {message}")]
    InvalidGraph { message: String },

    #[error("node {node_id} has invalid llc {llc}")]
    InvalidLlc { node_id: String, llc: i64 },

    #[error("stock for {sku_id} at node {node_id} would go negative ({attempted})")]
    NegativeStock {
        node_id: String,
        sku_id: String,
        attempted: i64,
    },

    #[error("no lead time configured for period {period} and no default set")]
    MissingLeadTime { period: i64 },

    #[error("strategy does not satisfy the required capability: {message}")]
    IncompatibleStrategy { message: String },

    #[error("node {node_id} is missing or has a malformed `{field}` field in node.data")]
    InvalidNodeData { node_id: String, field: String },
}

pub type SimResult<T> = Result<T, SimError>;
