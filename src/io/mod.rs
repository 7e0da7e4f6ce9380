//! The ambient I/O stack around the simulation core: JSON
//! (de)serialization and the pluggable metrics sink.

pub mod metrics;
pub mod parse;

pub use metrics::{FanOutSink, MetricEvent, MetricLevel, MetricsSink, NdjsonFileSink, NullSink};
pub use parse::{from_json_file, from_json_str, from_json_value, to_json_file, to_json_string, to_json_value};
