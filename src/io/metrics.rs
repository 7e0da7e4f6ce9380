//! Pluggable metrics sink.
//!
//! A small `MetricsSink` trait plus a default rotating-file
//! newline-delimited-JSON implementation. Emission failures are logged
//! via `tracing::warn!` and never abort the simulation.

use serde::Serialize;
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Severity of a [`MetricEvent`], mirroring the `level` field of its
/// record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricLevel {
    Debug,
    Info,
    Warn,
}

impl MetricLevel {
    fn as_str(self) -> &'static str {
        match self {
            MetricLevel::Debug => "DEBUG",
            MetricLevel::Info => "INFO",
            MetricLevel::Warn => "WARN",
        }
    }
}

/// One metrics record: `{timestamp, level, period, loop, node, event,
/// quantity, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricEvent {
    pub timestamp: String,
    pub level: String,
    pub period: i64,
    #[serde(rename = "loop")]
    pub loop_index: i64,
    pub node: String,
    pub event: String,
    pub quantity: f64,
    pub message: String,
}

impl MetricEvent {
    pub fn new(
        level: MetricLevel,
        period: i64,
        loop_index: i64,
        node: impl Into<String>,
        event: impl Into<String>,
        quantity: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: current_timestamp(),
            level: level.as_str().to_string(),
            period,
            loop_index,
            node: node.into(),
            event: event.into(),
            quantity,
            message: message.into(),
        }
    }
}

fn current_timestamp() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", since_epoch.as_secs(), since_epoch.subsec_millis())
}

/// Capability a simulation run emits [`MetricEvent`]s to.
pub trait MetricsSink: Debug {
    fn emit(&mut self, event: MetricEvent);
}

/// Drops every event. The default when no output is configured.
#[derive(Debug, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn emit(&mut self, _event: MetricEvent) {}
}

/// Fan out every event to each inner sink in order — a run attaches both
/// a file sink and an optional extra sink to the same stream of events.
#[derive(Debug)]
pub struct FanOutSink(Vec<Box<dyn MetricsSink>>);

impl FanOutSink {
    pub fn new(sinks: Vec<Box<dyn MetricsSink>>) -> Self {
        Self(sinks)
    }
}

impl MetricsSink for FanOutSink {
    fn emit(&mut self, event: MetricEvent) {
        for sink in &mut self.0 {
            sink.emit(event.clone());
        }
    }
}

/// Default sink: append-only newline-delimited JSON. When `max_bytes` is
/// exceeded the sink rolls over to a new file suffixed with a generation
/// number (`0 =>` never rotate).
#[derive(Debug)]
pub struct NdjsonFileSink {
    base_path: PathBuf,
    max_bytes: u64,
    written: u64,
    generation: u64,
}

impl NdjsonFileSink {
    pub fn new(base_path: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            base_path: base_path.into(),
            max_bytes,
            written: 0,
            generation: 0,
        }
    }

    fn current_path(&self) -> PathBuf {
        if self.generation == 0 {
            return self.base_path.clone();
        }
        let stem = self
            .base_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("metrics");
        let ext = self
            .base_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("ndjson");
        self.base_path
            .with_file_name(format!("{stem}.{}.{ext}", self.generation))
    }

    fn append(&self, path: &Path, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }

    fn rotate(&mut self) {
        self.generation += 1;
        self.written = 0;
    }
}

impl MetricsSink for NdjsonFileSink {
    fn emit(&mut self, event: MetricEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to serialize metric event");
                return;
            }
        };

        if self.max_bytes > 0 && self.written > 0 && self.written + line.len() as u64 + 1 > self.max_bytes {
            self.rotate();
        }

        let path = self.current_path();
        if let Err(e) = self.append(&path, &line) {
            warn!(error = %e, path = %path.display(), "failed to write metric event");
            return;
        }
        self.written += line.len() as u64 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_forwards_to_every_sink() {
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Debug)]
        struct CountingSink(Rc<RefCell<usize>>);
        impl MetricsSink for CountingSink {
            fn emit(&mut self, _event: MetricEvent) {
                *self.0.borrow_mut() += 1;
            }
        }

        let counter_a = Rc::new(RefCell::new(0));
        let counter_b = Rc::new(RefCell::new(0));
        let mut fan_out = FanOutSink::new(vec![
            Box::new(CountingSink(counter_a.clone())),
            Box::new(CountingSink(counter_b.clone())),
        ]);
        fan_out.emit(MetricEvent::new(MetricLevel::Info, 1, 0, "A", "sales", 5.0, ""));
        fan_out.emit(MetricEvent::new(MetricLevel::Info, 1, 0, "A", "sales", 5.0, ""));

        assert_eq!(*counter_a.borrow(), 2);
        assert_eq!(*counter_b.borrow(), 2);
    }

    #[test]
    fn metric_event_serializes_with_loop_field_renamed() {
        let event = MetricEvent::new(MetricLevel::Debug, 3, 1, "A", "node.backorders", 4.0, "");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["loop"], 1);
        assert_eq!(value["period"], 3);
        assert_eq!(value["node"], "A");
    }
}
